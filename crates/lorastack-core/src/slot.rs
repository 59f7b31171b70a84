//! Slot inputs and normalization
//!
//! The host form carries six repeated `(enabled, file, weight)` groups plus a
//! slot count selector. Normalization never fails: malformed counts degrade to
//! a safe default and out-of-range weights are clamped.

use serde::{Deserialize, Serialize};

/// Number of slots exposed by the node form
pub const MAX_SLOTS: usize = 6;

/// File reference shown when no LoRA files are available
pub const NO_LORAS_PLACEHOLDER: &str = "--no-loras--";

/// Lowest weight accepted by the form
pub const MIN_WEIGHT: f64 = -3.0;

/// Highest weight accepted by the form
pub const MAX_WEIGHT: f64 = 3.0;

/// Weight increment used by the form widget
pub const WEIGHT_STEP: f64 = 0.01;

/// Default weight for a fresh slot
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Returns true for sentinel file references such as `--no-loras--`.
pub fn is_placeholder(file_reference: &str) -> bool {
    file_reference.starts_with("--")
}

/// Effective slot count, always within `1..=MAX_SLOTS`
///
/// Deserializes from the host's string selector or a plain integer; both go
/// through the same clamping as [`SlotCount::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCount")]
pub struct SlotCount(usize);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

impl From<RawCount> for SlotCount {
    fn from(raw: RawCount) -> Self {
        match raw {
            RawCount::Signed(value) => Self(value.clamp(1, MAX_SLOTS as i64) as usize),
            RawCount::Unsigned(_) => Self(MAX_SLOTS),
            RawCount::Text(text) => Self::parse(&text),
        }
    }
}

impl SlotCount {
    /// Create a slot count, clamping into range
    pub fn new(count: usize) -> Self {
        Self(count.clamp(1, MAX_SLOTS))
    }

    /// Parse a count from the host's string selector.
    ///
    /// Non-numeric input yields 1. Integer literals too large for `i64` still
    /// clamp by sign.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let value = match trimmed.parse::<i64>() {
            Ok(value) => value,
            Err(_) if is_integer_literal(trimmed) => {
                if trimmed.starts_with('-') {
                    i64::MIN
                } else {
                    i64::MAX
                }
            }
            Err(_) => 1,
        };

        Self(value.clamp(1, MAX_SLOTS as i64) as usize)
    }

    /// Get the count
    pub fn get(&self) -> usize {
        self.0
    }

    /// Whether a 1-based slot index falls within this count
    pub fn includes(&self, index: usize) -> bool {
        index >= 1 && index <= self.0
    }
}

impl Default for SlotCount {
    fn default() -> Self {
        Self(1)
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// One `(enabled, file, weight)` group as entered in the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotInput {
    /// Whether the slot is switched on
    pub enabled: bool,
    /// Selected file name, as listed by the storage resolver
    pub file: String,
    /// Strength applied to the adapter
    pub weight: f64,
}

impl SlotInput {
    /// Create an enabled slot input
    pub fn enabled(file: impl Into<String>, weight: f64) -> Self {
        Self {
            enabled: true,
            file: file.into(),
            weight,
        }
    }
}

impl Default for SlotInput {
    fn default() -> Self {
        Self {
            enabled: false,
            file: NO_LORAS_PLACEHOLDER.to_string(),
            weight: DEFAULT_WEIGHT,
        }
    }
}

/// A normalized slot ready for resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub enabled: bool,
    pub file_reference: String,
    pub weight: f64,
    /// 1-based position in the form
    pub index: usize,
}

impl Slot {
    /// Whether this slot should be resolved under the given count
    pub fn is_active(&self, count: SlotCount) -> bool {
        count.includes(self.index) && self.enabled && !is_placeholder(&self.file_reference)
    }

    /// Form field the UI anchors this slot's trigger widget to
    pub fn weight_field(&self) -> String {
        weight_field(self.index)
    }
}

/// Name of the weight field for a 1-based slot index
pub fn weight_field(index: usize) -> String {
    format!("lora{index}_weight")
}

/// The six slot groups of the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotInputs {
    slots: [SlotInput; MAX_SLOTS],
}

impl SlotInputs {
    /// Create from six explicit groups
    pub fn new(slots: [SlotInput; MAX_SLOTS]) -> Self {
        Self { slots }
    }

    /// Replace the group at a 1-based index. Indexes outside `1..=6` are ignored.
    pub fn with_slot(mut self, index: usize, input: SlotInput) -> Self {
        if let Some(slot) = index.checked_sub(1).and_then(|i| self.slots.get_mut(i)) {
            *slot = input;
        }
        self
    }

    /// Get the group at a 1-based index
    pub fn get(&self, index: usize) -> Option<&SlotInput> {
        index.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    /// Build the ordered slot list, indexes 1 through 6
    pub fn normalize(&self) -> Vec<Slot> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, input)| Slot {
                enabled: input.enabled,
                file_reference: input.file.clone(),
                weight: clamp_weight(input.weight),
                index: i + 1,
            })
            .collect()
    }
}

fn clamp_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        tracing::debug!("NaN weight replaced with default");
        return DEFAULT_WEIGHT;
    }
    weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_count_parse() {
        assert_eq!(SlotCount::parse("3").get(), 3);
        assert_eq!(SlotCount::parse(" 6 ").get(), 6);
        assert_eq!(SlotCount::parse("0").get(), 1);
        assert_eq!(SlotCount::parse("-4").get(), 1);
        assert_eq!(SlotCount::parse("9").get(), 6);
        assert_eq!(SlotCount::parse("+2").get(), 2);
    }

    #[test]
    fn test_slot_count_non_numeric_defaults_to_one() {
        assert_eq!(SlotCount::parse("three").get(), 1);
        assert_eq!(SlotCount::parse("").get(), 1);
        assert_eq!(SlotCount::parse("2.5").get(), 1);
    }

    #[test]
    fn test_slot_count_overflow_clamps_by_sign() {
        assert_eq!(SlotCount::parse("99999999999999999999999").get(), 6);
        assert_eq!(SlotCount::parse("-99999999999999999999999").get(), 1);
    }

    #[test]
    fn test_slot_count_deserialize_clamps() {
        let count: SlotCount = serde_json::from_str("0").unwrap();
        assert_eq!(count.get(), 1);

        let count: SlotCount = serde_json::from_str(r#""3""#).unwrap();
        assert_eq!(count.get(), 3);

        let count: SlotCount = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(count.get(), 1);

        let count: SlotCount = serde_json::from_str("-4").unwrap();
        assert_eq!(count.get(), 1);

        let count: SlotCount = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(count.get(), 6);

        let json = serde_json::to_string(&SlotCount::new(4)).unwrap();
        assert_eq!(json, "4");
        assert_eq!(serde_json::from_str::<SlotCount>(&json).unwrap().get(), 4);
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder(NO_LORAS_PLACEHOLDER));
        assert!(is_placeholder("--none--"));
        assert!(!is_placeholder("style-v2.safetensors"));
    }

    #[test]
    fn test_normalize_indexes_and_clamps() {
        let inputs = SlotInputs::default()
            .with_slot(1, SlotInput::enabled("a.safetensors", 0.8))
            .with_slot(4, SlotInput::enabled("b.safetensors", 7.5))
            .with_slot(9, SlotInput::enabled("ignored.safetensors", 1.0));

        let slots = inputs.normalize();
        assert_eq!(slots.len(), MAX_SLOTS);
        assert_eq!(
            slots.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert_eq!(slots[0].weight, 0.8);
        assert_eq!(slots[3].weight, MAX_WEIGHT);
        assert!(!slots[1].enabled);
    }

    #[test]
    fn test_slot_activity() {
        let count = SlotCount::new(2);
        let slots = SlotInputs::default()
            .with_slot(1, SlotInput::enabled("a.safetensors", 1.0))
            .with_slot(2, SlotInput::enabled(NO_LORAS_PLACEHOLDER, 1.0))
            .with_slot(3, SlotInput::enabled("c.safetensors", 1.0))
            .normalize();

        assert!(slots[0].is_active(count));
        assert!(!slots[1].is_active(count));
        assert!(!slots[2].is_active(count));
        assert_eq!(slots[0].weight_field(), "lora1_weight");
    }
}
