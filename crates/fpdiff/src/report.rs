//! Bit-exact comparison of two result sets and report rendering.
//!
//! Every operand is rendered twice: as a signed decimal with ten fractional
//! digits and as its IEEE-754 bit pattern, so a one-ulp difference is
//! visible even when the decimals agree.

use std::fmt;

use fpdiff_input::GeneratorKind;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{error, info};

/// Comparison errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReportError {
    #[error("result length mismatch: {inputs} inputs, {reference} reference, {optimized} optimized")]
    LengthMismatch {
        inputs: usize,
        reference: usize,
        optimized: usize,
    },
}

/// Bit-pattern parse errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseBitsError {
    #[error("empty bit pattern")]
    Empty,
    #[error("invalid bit pattern '{0}' (expected up to 8 hex digits)")]
    Invalid(String),
}

/// Outcome for one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Bit-exact comparison: `+0`/`-0` differ, identical NaNs agree.
    #[must_use]
    pub const fn of(reference: f32, optimized: f32) -> Self {
        if reference.to_bits() == optimized.to_bits() {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("Pass"),
            Self::Fail => f.write_str("Fail"),
        }
    }
}

/// One input with both results.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResultPair {
    /// 1-based position in the input set.
    pub index: usize,
    #[serde(serialize_with = "serialize_operand")]
    pub input: f32,
    #[serde(serialize_with = "serialize_operand")]
    pub reference: f32,
    #[serde(serialize_with = "serialize_operand")]
    pub optimized: f32,
    pub verdict: Verdict,
}

impl ResultPair {
    /// Render the four-line block for this sample.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "#{}: {}\n      Input: {}\n    Result1: {}\n    Result2: {}",
            self.index,
            self.verdict,
            format_single(self.input),
            format_single(self.reference),
            format_single(self.optimized),
        )
    }
}

fn serialize_operand<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("Operand", 2)?;
    s.serialize_field("value", value)?;
    s.serialize_field("bits", &format!("{:08x}", value.to_bits()))?;
    s.end()
}

/// Format as `<sign><value to 10 places> (<8 hex digits>)`.
///
/// The sign comes from the sign bit, so `-0.0` renders as `-0.0000000000`.
#[must_use]
pub fn format_single(value: f32) -> String {
    let sign = if value.is_sign_negative() { '-' } else { '+' };
    format!("{sign}{:.10} ({:08x})", value.abs(), value.to_bits())
}

/// Decode a bit pattern printed by [`format_single`].
///
/// Accepts bare hex (`3d274f70`), `0x`-prefixed hex, or a whole formatted
/// operand, in which case the parenthesized part is used.
///
/// # Errors
///
/// Returns [`ParseBitsError`] if no valid 32-bit hex pattern is found.
pub fn decode_bits(text: &str) -> Result<f32, ParseBitsError> {
    let mut hex = text.trim().trim_end_matches(')').trim_end();
    if let Some(open) = hex.rfind('(') {
        hex = &hex[open + 1..];
    }
    hex = hex.trim();
    let digits = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);

    if digits.is_empty() {
        return Err(ParseBitsError::Empty);
    }
    if digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseBitsError::Invalid(text.trim().to_string()));
    }
    u32::from_str_radix(digits, 16)
        .map(f32::from_bits)
        .map_err(|_| ParseBitsError::Invalid(text.trim().to_string()))
}

/// Pair up inputs with both result sets.
///
/// # Errors
///
/// Returns [`ReportError::LengthMismatch`] unless all three slices have the
/// same length.
pub fn compare(
    inputs: &[f32],
    reference: &[f32],
    optimized: &[f32],
) -> Result<Vec<ResultPair>, ReportError> {
    if reference.len() != inputs.len() || optimized.len() != inputs.len() {
        return Err(ReportError::LengthMismatch {
            inputs: inputs.len(),
            reference: reference.len(),
            optimized: optimized.len(),
        });
    }

    Ok(inputs
        .iter()
        .zip(reference)
        .zip(optimized)
        .enumerate()
        .map(|(i, ((&input, &reference), &optimized))| ResultPair {
            index: i + 1,
            input,
            reference,
            optimized,
            verdict: Verdict::of(reference, optimized),
        })
        .collect())
}

/// Receives rendered samples. Failing samples arrive through [`Self::fail`].
pub trait ReportSink {
    fn pass(&mut self, pair: &ResultPair, block: &str);
    fn fail(&mut self, pair: &ResultPair, block: &str);

    /// Called once after every sample.
    fn finish(&mut self, _report: &Report) {}
}

/// Routes passing samples to `info` and failing samples to `error`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn pass(&mut self, pair: &ResultPair, block: &str) {
        info!(index = pair.index, "{block}");
    }

    fn fail(&mut self, pair: &ResultPair, block: &str) {
        error!(index = pair.index, "{block}");
    }

    fn finish(&mut self, report: &Report) {
        info!(
            passed = report.passed(),
            failed = report.failed(),
            reference = %report.reference,
            optimized = %report.optimized,
            "comparison complete"
        );
    }
}

/// Result of one comparison run.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub seed: i32,
    pub generator: GeneratorKind,
    /// Name of the baseline evaluator.
    pub reference: String,
    /// Name of the evaluator under test.
    pub optimized: String,
    passed: usize,
    failed: usize,
    pub samples: Vec<ResultPair>,
}

impl Report {
    /// Build a report, tallying verdicts.
    #[must_use]
    pub fn new(
        seed: i32,
        generator: GeneratorKind,
        reference: impl Into<String>,
        optimized: impl Into<String>,
        samples: Vec<ResultPair>,
    ) -> Self {
        let passed = samples.iter().filter(|p| p.verdict.is_pass()).count();
        Self {
            seed,
            generator,
            reference: reference.into(),
            optimized: optimized.into(),
            passed,
            failed: samples.len() - passed,
            samples,
        }
    }

    #[must_use]
    pub const fn passed(&self) -> usize {
        self.passed
    }

    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// One-line totals.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed ({} vs {})",
            self.passed, self.failed, self.reference, self.optimized
        )
    }

    /// All sample blocks followed by the summary line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for pair in &self.samples {
            out.push_str(&pair.render());
            out.push('\n');
        }
        out.push_str(&self.summary());
        out.push('\n');
        out
    }

    /// Feed every sample to `sink`, then finish it.
    pub fn emit(&self, sink: &mut dyn ReportSink) {
        for pair in &self.samples {
            let block = pair.render();
            if pair.verdict.is_pass() {
                sink.pass(pair, &block);
            } else {
                sink.fail(pair, &block);
            }
        }
        sink.finish(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CollectSink {
        passed: Vec<usize>,
        failed: Vec<usize>,
        finished: bool,
    }

    impl ReportSink for CollectSink {
        fn pass(&mut self, pair: &ResultPair, _block: &str) {
            self.passed.push(pair.index);
        }

        fn fail(&mut self, pair: &ResultPair, _block: &str) {
            self.failed.push(pair.index);
        }

        fn finish(&mut self, _report: &Report) {
            self.finished = true;
        }
    }

    #[test]
    fn test_format_single() {
        assert_eq!(
            format_single(f32::from_bits(0x3d27_4f70)),
            "+0.0408472419 (3d274f70)"
        );
        assert_eq!(format_single(-1.5), "-1.5000000000 (bfc00000)");
        assert_eq!(format_single(0.0), "+0.0000000000 (00000000)");
        assert_eq!(format_single(-0.0), "-0.0000000000 (80000000)");
    }

    #[test]
    fn test_decode_roundtrip() {
        let values = [
            0.1f32,
            -0.1,
            0.0,
            -0.0,
            f32::MIN_POSITIVE,
            f32::from_bits(1),
            f32::MAX,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::NAN,
            f32::from_bits(0x3d4c_ca29),
        ];
        for v in values {
            let decoded = decode_bits(&format_single(v)).unwrap();
            assert_eq!(decoded.to_bits(), v.to_bits(), "{v}");
        }
    }

    #[test]
    fn test_decode_forms() {
        assert_eq!(decode_bits("3dcccccd").unwrap(), 0.1);
        assert_eq!(decode_bits("0x3dcccccd").unwrap(), 0.1);
        assert_eq!(decode_bits(" (3dcccccd) ").unwrap(), 0.1);
        assert_eq!(decode_bits(" 3f800000 )").unwrap(), 1.0);
        assert_eq!(decode_bits("0x3f800000)").unwrap(), 1.0);
        assert_eq!(decode_bits("0").unwrap().to_bits(), 0);
        assert_eq!(decode_bits(""), Err(ParseBitsError::Empty));
        assert_eq!(decode_bits("0x"), Err(ParseBitsError::Empty));
        assert!(matches!(decode_bits("3dcccccd00"), Err(ParseBitsError::Invalid(_))));
        assert!(matches!(decode_bits("zz"), Err(ParseBitsError::Invalid(_))));
        assert!(matches!(decode_bits("+1"), Err(ParseBitsError::Invalid(_))));
    }

    #[test]
    fn test_verdict_is_bit_exact() {
        assert_eq!(Verdict::of(1.0, 1.0), Verdict::Pass);
        assert_eq!(Verdict::of(0.0, -0.0), Verdict::Fail);
        assert_eq!(Verdict::of(f32::NAN, f32::NAN), Verdict::Pass);
        let a = f32::from_bits(0x3d4c_ca29);
        let b = f32::from_bits(0x3d4c_ca2a);
        assert_eq!(Verdict::of(a, b), Verdict::Fail);
    }

    #[test]
    fn test_compare_length_mismatch() {
        let err = compare(&[1.0, 2.0], &[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            ReportError::LengthMismatch {
                inputs: 2,
                reference: 2,
                optimized: 1
            }
        );
    }

    #[test]
    fn test_render_block() {
        let pairs = compare(
            &[f32::from_bits(0x3ecc_c980)],
            &[f32::from_bits(0x3d4c_ca29)],
            &[f32::from_bits(0x3d4c_ca2a)],
        )
        .unwrap();
        let block = pairs[0].render();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "#1: Fail");
        assert!(lines[1].starts_with("      Input: +0.39997482"));
        assert!(lines[1].ends_with("(3eccc980)"));
        assert!(lines[2].ends_with("(3d4cca29)"));
        assert!(lines[3].ends_with("(3d4cca2a)"));
    }

    #[test]
    fn test_emit_routes_by_verdict() {
        let pairs = compare(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], &[1.0, 2.5, 3.0]).unwrap();
        let report = Report::new(1, GeneratorKind::Legacy, "reference", "folded", pairs);
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_passed());

        let mut sink = CollectSink::default();
        report.emit(&mut sink);
        assert_eq!(sink.passed, vec![1, 3]);
        assert_eq!(sink.failed, vec![2]);
        assert!(sink.finished);

        assert!(
            report
                .render()
                .ends_with("2 passed, 1 failed (reference vs folded)\n")
        );
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new(0, GeneratorKind::ChaCha, "a", "b", Vec::new());
        assert!(report.all_passed());
        assert_eq!(report.render(), "0 passed, 0 failed (a vs b)\n");
    }
}
