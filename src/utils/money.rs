pub fn to_minor(baht: f64) -> i64 {
    if !baht.is_finite() {
        return 0;
    }
    (baht * 100.0).round() as i64
}

pub fn from_minor(satang: i64) -> f64 {
    satang as f64 / 100.0
}

pub mod baht {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::from_minor(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let baht = f64::deserialize(deserializer)?;
        Ok(super::to_minor(baht))
    }
}
