// src/format/formatter.rs

//! Renders a [`LogEvent`] through a directive list to a single string.

use crate::data::datetime::datetime_to_string;
use crate::data::event::{LogEvent, SourceLocation};
use crate::format::color::{sgr_color_prefix, SGR_RESET};
use crate::format::directive::{
    Directive,
    LOC_PLACEHOLDER_FILE_NAME,
    LOC_PLACEHOLDER_FUNCTION_NAME,
    LOC_PLACEHOLDER_LINE,
};
use crate::format::factory::ComponentFactory;

use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Formatter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Renders [`LogEvent`]s through a [`ComponentFactory`]'s directive list.
///
/// Cheap to clone; the directive list is shared.
#[derive(Clone, Debug)]
pub struct Formatter {
    factory: Arc<ComponentFactory>,
}

impl Formatter {
    pub fn new(factory: ComponentFactory) -> Formatter {
        Formatter {
            factory: Arc::new(factory),
        }
    }

    /// A `Formatter` over the settings document, falling back to the
    /// hard-coded default directive list when the document is unusable.
    ///
    /// Infallible on purpose: sinks constructed without an explicit
    /// formatter must always come up.
    pub fn from_settings_or_default() -> Formatter {
        match ComponentFactory::new() {
            Ok(factory) => Formatter::new(factory),
            Err(err) => {
                crate::de_wrn!("settings unusable ({}); using default components", err);
                Formatter::default()
            }
        }
    }

    /// The rendering plan this formatter walks.
    #[inline(always)]
    pub fn factory(&self) -> &ComponentFactory {
        &self.factory
    }

    /// Render `event` to one string.
    ///
    /// 1. Pre-scan for a `Color` directive; resolve the event's level
    ///    through its map to an SGR prefix.
    /// 2. Walk the directives in order, appending each emission.
    ///
    /// Rendering is a diagnostic tool, not a critical path: color lookup
    /// failures fall back (with a stderr diagnostic) rather than abort,
    /// and unknown `{…}` text in a location template passes through
    /// verbatim.
    pub fn format_event(
        &self,
        event: &LogEvent,
    ) -> String {
        let directives: &[Directive] = self.factory.directives();

        let color_prefix: Option<String> = self
            .factory
            .level_colors()
            .and_then(|map| map.get(event.level().as_lower_str()))
            .map(|name| sgr_color_prefix(name));

        let mut out: String = String::with_capacity(event.msg().len() + 256);
        for directive in directives.iter() {
            match directive {
                Directive::Timestamp => {
                    out.push('[');
                    out.push_str(datetime_to_string(event.timestamp()).as_str());
                    out.push(']');
                }
                Directive::Level => {
                    if let Some(prefix) = color_prefix.as_deref() {
                        out.push_str(prefix);
                    }
                    out.push('[');
                    out.push_str(event.level().as_str());
                    out.push(']');
                    if color_prefix.is_some() {
                        out.push_str(SGR_RESET);
                    }
                }
                Directive::ThreadId => {
                    out.push_str("[tid: ");
                    out.push_str(
                        event
                            .thread_id()
                            .to_string()
                            .as_str(),
                    );
                    out.push(']');
                }
                Directive::SourceLocation(template) => {
                    format_source_location(event.source_location(), template, &mut out);
                }
                Directive::Message => {
                    if let Some(prefix) = color_prefix.as_deref() {
                        out.push_str(prefix);
                    }
                    out.push_str(event.msg());
                    if color_prefix.is_some() {
                        out.push_str(SGR_RESET);
                    }
                }
                Directive::Text(text) => {
                    out.push_str(text.as_str());
                }
                // consumed during the pre-scan
                Directive::Color(_) => {}
            }
        }

        out
    }
}

impl Default for Formatter {
    fn default() -> Formatter {
        Formatter::new(ComponentFactory::with_defaults())
    }
}

/// Substitute `{file_name}`, `{function_name}`, and `{line}` in `template`,
/// appending to `out`.
///
/// Unknown `{…}` text passes through verbatim, one character at a time.
fn format_source_location(
    loc: &SourceLocation,
    template: &str,
    out: &mut String,
) {
    let mut rest: &str = template;
    while let Some(brace_at) = rest.find('{') {
        out.push_str(&rest[..brace_at]);
        rest = &rest[brace_at..];
        if let Some(after) = rest.strip_prefix(LOC_PLACEHOLDER_FILE_NAME) {
            out.push_str(loc.file_name());
            rest = after;
        } else if let Some(after) = rest.strip_prefix(LOC_PLACEHOLDER_FUNCTION_NAME) {
            out.push_str(loc.function_name());
            rest = after;
        } else if let Some(after) = rest.strip_prefix(LOC_PLACEHOLDER_LINE) {
            out.push_str(
                loc.line()
                    .to_string()
                    .as_str(),
            );
            rest = after;
        } else {
            out.push('{');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
}
