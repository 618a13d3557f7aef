use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Evaluation state after `instances_seen` instances.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub instances_seen: u64,
    pub accuracy: f64,
    pub kappa: f64,
    pub ram_hours: f64,
    pub seconds: f64,
    #[serde(flatten)]
    pub extras: BTreeMap<String, f64>,
}

/// Extras printed first, in this order; any others follow alphabetically.
const EXTRAS_ORDER: &[&str] = &["kappa_t", "kappa_m", "precision", "recall", "f1"];

impl Snapshot {
    #[inline]
    fn fmtv(v: f64) -> String {
        if v.is_nan() {
            "NaN".into()
        } else {
            format!("{v:.6}")
        }
    }

    /// Extras in display order.
    pub fn ordered_extras(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        let known = EXTRAS_ORDER
            .iter()
            .filter_map(|key| self.extras.get(*key).map(|v| (*key, *v)));
        let rest = self
            .extras
            .iter()
            .filter(|(k, _)| !EXTRAS_ORDER.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), *v));
        known.chain(rest)
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "seen={}, acc={}, kappa={}, ram_h={:.3e}, t={:.6}s",
            self.instances_seen,
            Self::fmtv(self.accuracy),
            Self::fmtv(self.kappa),
            self.ram_hours,
            self.seconds
        )?;
        for (key, value) in self.ordered_extras() {
            write!(f, ", {key}={}", Self::fmtv(value))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        let mut extras = BTreeMap::new();
        extras.insert("zeta".to_string(), 1.0);
        extras.insert("f1".to_string(), 0.5);
        extras.insert("kappa_t".to_string(), f64::NAN);
        Snapshot {
            instances_seen: 10,
            accuracy: 0.9,
            kappa: f64::NAN,
            ram_hours: 0.0,
            seconds: 1.5,
            extras,
        }
    }

    #[test]
    fn display_orders_known_extras_first() {
        let text = snapshot().to_string();
        assert!(text.starts_with("seen=10, acc=0.900000, kappa=NaN"));
        assert!(text.ends_with("kappa_t=NaN, f1=0.500000, zeta=1.000000"));
    }

    #[test]
    fn serializes_extras_flat() {
        let v = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(v["instances_seen"], 10);
        assert_eq!(v["f1"], 0.5);
        assert!(v["kappa"].is_null());
    }
}
