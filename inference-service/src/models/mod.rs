pub mod labels;

pub use labels::{DEFAULT_CLASS_LABELS, DEFAULT_RISK_SCORE, LabelSet, RiskMap};
