/// Inverse-time decay `t_ref / (months + epsilon)`.
pub fn time_weight_factor(months: i64, t_ref: f64, epsilon: f64) -> f64 {
    t_ref / (months as f64 + epsilon)
}
