/// Body-mass index from weight in kilograms and height in centimetres,
/// rounded to two decimals. `None` when either input is unusable.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if !weight_kg.is_finite() || !height_cm.is_finite() || weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let value = weight_kg / (height_m * height_m);
    Some((value * 100.0).round() / 100.0)
}
