// src/format/directive.rs

//! The render directives a [`ComponentFactory`] emits and a
//! [`Formatter`] walks.
//!
//! [`ComponentFactory`]: crate::format::factory::ComponentFactory
//! [`Formatter`]: crate::format::formatter::Formatter

pub use crate::settings::LevelColorMap;

/// One ordered element of a formatter's rendering plan.
///
/// Built once at [`ComponentFactory`] construction, immutable thereafter.
/// The list order is the emission order.
///
/// A dedicated enum (rather than the settings document's free-form
/// `{type, data}` pairs) avoids a string compare per event on the hot
/// render path.
///
/// [`ComponentFactory`]: crate::format::factory::ComponentFactory
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Directive {
    /// the event wall-clock timestamp, self-bracketed `[…]`
    Timestamp,
    /// the event severity as `[LEVEL]`, colored when a `Color` directive
    /// is present
    Level,
    /// the submitting thread id as `[tid: N]`
    ThreadId,
    /// the event call site, rendered through a template substituting
    /// `{file_name}`, `{function_name}`, and `{line}`
    SourceLocation(String),
    /// the event payload, colored when a `Color` directive is present
    Message,
    /// level to color-name map; consumed during the formatter's pre-scan,
    /// emits nothing by itself
    Color(LevelColorMap),
    /// literal text between pattern tokens
    Text(String),
}

impl Directive {
    /// Returns `true` if the directive is [`Color`].
    ///
    /// [`Color`]: self::Directive#variant.Color
    #[inline(always)]
    pub const fn is_color(&self) -> bool {
        matches!(*self, Directive::Color(_))
    }

    /// Returns `true` if the directive emits text by itself
    /// (everything except [`Color`]).
    ///
    /// [`Color`]: self::Directive#variant.Color
    #[inline(always)]
    pub const fn is_emitting(&self) -> bool {
        !self.is_color()
    }
}

/// The `loc` template used by the hard-coded default directive list.
pub const LOC_TEMPLATE_DEFAULT: &str = "[{file_name}:{function_name}:{line}]";

/// The `{file_name}` placeholder recognized by
/// [`Directive::SourceLocation`] templates.
pub const LOC_PLACEHOLDER_FILE_NAME: &str = "{file_name}";
/// The `{function_name}` placeholder.
pub const LOC_PLACEHOLDER_FUNCTION_NAME: &str = "{function_name}";
/// The `{line}` placeholder.
pub const LOC_PLACEHOLDER_LINE: &str = "{line}";
