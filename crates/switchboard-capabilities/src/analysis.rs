//! Arithmetic mean of comma-separated integers.

use std::num::IntErrorKind;

use async_trait::async_trait;
use switchboard_core::{Capability, CapabilityError, CapabilityResult};

/// Reply when the input has no numbers at all.
pub const NO_DATA: &str = "Нет данных для анализа.";

/// Computes the average of a list such as `2, 4, 6`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataAnalyzer;

impl DataAnalyzer {
    /// Creates the analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Parses `input` into integers.
    ///
    /// Returns an empty list for blank input. Every comma-separated token is
    /// trimmed and must be an integer that fits in 128 bits.
    pub fn parse(input: &str) -> CapabilityResult<Vec<i128>> {
        if input.trim().is_empty() {
            return Ok(Vec::new());
        }

        input
            .split(',')
            .map(|token| {
                let token = token.trim();
                token.parse::<i128>().map_err(|e| {
                    let hint = match e.kind() {
                        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                            format!("число «{token}» слишком большое")
                        }
                        _ => format!("«{token}» не является целым числом. Пример ввода: 2, 4, 6"),
                    };
                    CapabilityError::validation(hint)
                })
            })
            .collect()
    }

    /// Mean of `values`, or `None` when there are none.
    pub fn mean(values: &[i128]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sum = values
            .iter()
            .try_fold(0i128, |acc, &v| acc.checked_add(v))
            .map(|sum| sum as f64)
            .unwrap_or_else(|| values.iter().map(|&v| v as f64).sum());
        Some(sum / values.len() as f64)
    }
}

#[async_trait]
impl Capability for DataAnalyzer {
    fn name(&self) -> &'static str {
        "analysis"
    }

    async fn handle(&self, input: &str) -> CapabilityResult<String> {
        let values = Self::parse(input)?;
        Ok(match Self::mean(&values) {
            // `{:?}` keeps the fractional part for whole numbers: 4.0, not 4.
            Some(avg) => format!("Среднее значение: {avg:?}"),
            None => NO_DATA.to_string(),
        })
    }
}
