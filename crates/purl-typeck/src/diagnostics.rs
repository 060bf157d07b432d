//! Ariadne-based diagnostic rendering for type errors.
//!
//! Grounded on the sibling pack crate's `snow-typeck::diagnostics`: a
//! per-variant error code, colorless config for stable snapshot output, and
//! a `clamp` helper keeping spans inside the source. Differs from that
//! crate in one way its authors never had to deal with: every position here
//! is a resolved `purl_common::Pos` (line/col), not a raw `rowan::TextRange`,
//! so spans are reconstructed via `LineIndex::offset_of` and are always a
//! single highlighted point rather than a token's full width.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use purl_common::{LineIndex, Pos};

use crate::error::TypeError;

fn error_code(err: &TypeError) -> &'static str {
    match err {
        TypeError::Mismatch { .. } => "E0001",
        TypeError::OccursCheck { .. } => "E0002",
        TypeError::KindMismatch { .. } => "E0003",
        TypeError::RepeatedLabels { .. } => "E0004",
        TypeError::LabelCannotBeInserted { .. } => "E0005",
        TypeError::RecursiveRowType { .. } => "E0006",
        TypeError::UnboundVariable { .. } => "E0007",
        TypeError::UnboundTypeVariable { .. } => "E0008",
        TypeError::UnknownConstraintVariable { .. } => "E0009",
        TypeError::RecordWildcardNotARecord { .. } => "E0010",
        TypeError::SynonymArityMismatch { .. } => "E0011",
        TypeError::UnknownSynonym { .. } => "E0012",
    }
}

/// A single-point span at `pos`, clamped inside `source`.
fn point_span(pos: &Pos, source: &str) -> Range<usize> {
    let index = LineIndex::new(source);
    let offset = index.offset_of(pos.line, pos.col) as usize;
    let clamped = offset.min(source.len());
    let end = clamped.saturating_add(1).min(source.len().max(clamped));
    clamped..end.max(clamped)
}

/// Render a type error into a formatted diagnostic string. Output is
/// colorless so it renders identically regardless of terminal support.
pub fn render_diagnostic(error: &TypeError, source: &str) -> String {
    let config = Config::default().with_color(false);
    let code = error_code(error);
    let span = point_span(error.pos(), source);
    let message = error.to_string();

    let mut builder = Report::build(ReportKind::Error, span.clone())
        .with_code(code)
        .with_message(&message)
        .with_config(config);

    // A mismatch carries two positions -- where the expected type was
    // required and where the found type was actually inferred -- so it gets
    // two labels, one per side, instead of one label repeating the message.
    if let TypeError::Mismatch { expected, found, .. } = error {
        builder.add_label(
            Label::new(span)
                .with_message(format!("expected `{}`", expected))
                .with_color(Color::Red),
        );
        if let Some(found_pos) = error.found_pos() {
            let found_span = point_span(found_pos, source);
            builder.add_label(
                Label::new(found_span)
                    .with_message(format!("found `{}`", found))
                    .with_color(Color::Blue),
            );
        }
    } else {
        builder.add_label(Label::new(span).with_message(message.clone()).with_color(Color::Red));
    }

    let mut buf = Vec::new();
    builder
        .finish()
        .write(Source::from(source), &mut buf)
        .expect("writing to an in-memory buffer should not fail");
    String::from_utf8(buf).expect("ariadne writes valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstraintOrigin;
    use crate::ty::Ty;
    use std::sync::Arc;

    #[test]
    fn renders_mismatch_with_error_code() {
        let source = "1 + True";
        let expected_pos = Pos::new(Arc::from("test.pr"), 1, 1);
        let found_pos = Pos::new(Arc::from("test.pr"), 1, 5);
        let error = TypeError::Mismatch {
            expected: Ty::Int,
            expected_origin: ConstraintOrigin::Builtin { pos: expected_pos },
            found: Ty::Bool,
            found_origin: ConstraintOrigin::Builtin { pos: found_pos },
        };
        let rendered = render_diagnostic(&error, source);
        assert!(rendered.contains("E0001"));
        assert!(rendered.contains("Int"));
        assert!(rendered.contains("Bool"));
    }

    #[test]
    fn renders_unbound_variable() {
        let source = "x";
        let pos = Pos::new(Arc::from("test.pr"), 1, 1);
        let error = TypeError::UnboundVariable { name: "x".to_string(), pos };
        let rendered = render_diagnostic(&error, source);
        assert!(rendered.contains("E0007"));
        assert!(rendered.contains("unbound variable"));
    }
}
