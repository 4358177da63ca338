// src/format/factory.rs

//! Builds the ordered directive list a [`Formatter`] renders through,
//! from either of two inputs: the settings JSON document
//! (the *JSON dialect*) or a `%`-pattern string (the *pattern dialect*).
//!
//! [`Formatter`]: crate::format::formatter::Formatter

use crate::common::{FPath, LogResult};
use crate::data::level::LogLevel;
use crate::format::directive::{
    Directive,
    LevelColorMap,
    LOC_PLACEHOLDER_FILE_NAME,
    LOC_PLACEHOLDER_FUNCTION_NAME,
    LOC_PLACEHOLDER_LINE,
    LOC_TEMPLATE_DEFAULT,
};
use crate::settings::{ComponentSpec, Settings, SETTINGS_FILE_PATH};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ComponentFactory
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default color palette of the hard-coded directive list.
const LEVEL_COLORS_DEFAULT: [(LogLevel, &str); 6] = [
    (LogLevel::Debug, "white"),
    (LogLevel::Info, "cyan"),
    (LogLevel::Notice, "blue"),
    (LogLevel::Warn, "yellow"),
    (LogLevel::Error, "red"),
    (LogLevel::Fatal, "magenta"),
];

/// Pattern-dialect parser state.
///
/// Starting in `NormalText`, a `%` switches to `PatternChar`; there the
/// next alphabetic letter resolves one directive and the parser returns
/// to `NormalText`. A `%` followed by a non-letter drops the `%`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum PatternState {
    NormalText,
    PatternChar,
}

/// Builds and owns the ordered list of render [`Directive`]s.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ComponentFactory {
    directives: Vec<Directive>,
}

impl ComponentFactory {
    /// Build from the settings document at [`SETTINGS_FILE_PATH`].
    ///
    /// A missing file, or a document lacking a `components` key, yields
    /// the hard-coded default list ([`with_defaults`]). A document that
    /// exists but cannot be read or parsed is an error, never silently
    /// defaulted.
    ///
    /// [`with_defaults`]: ComponentFactory::with_defaults
    pub fn new() -> LogResult<ComponentFactory> {
        ComponentFactory::from_settings_path(&FPath::from(SETTINGS_FILE_PATH))
    }

    /// Like [`new`] but reading the document at `path`.
    ///
    /// [`new`]: ComponentFactory::new
    pub fn from_settings_path(path: &FPath) -> LogResult<ComponentFactory> {
        defn!("({:?})", path);
        let settings: Settings = match Settings::from_path(path)? {
            Some(val) => val,
            None => {
                defx!("({:?}) no settings file; using default components", path);
                return Ok(ComponentFactory::with_defaults());
            }
        };
        let factory: ComponentFactory = match settings.components {
            Some(ref specs) => ComponentFactory::from_components(specs),
            None => {
                defo!("({:?}) no \"components\" key; using default components", path);
                ComponentFactory::with_defaults()
            }
        };
        defx!("({:?}) {} directives", path, factory.directives.len());

        Ok(factory)
    }

    /// The hard-coded default directive list: timestamp, level, thread id,
    /// location `"[{file_name}:{function_name}:{line}]"`, message, and the
    /// default color palette.
    pub fn with_defaults() -> ComponentFactory {
        let mut level_colors = LevelColorMap::new();
        for (level, color) in LEVEL_COLORS_DEFAULT.iter() {
            level_colors.insert(level.as_lower_str().to_string(), color.to_string());
        }

        ComponentFactory {
            directives: vec![
                Directive::Timestamp,
                Directive::Level,
                Directive::ThreadId,
                Directive::SourceLocation(LOC_TEMPLATE_DEFAULT.to_string()),
                Directive::Message,
                Directive::Color(level_colors),
            ],
        }
    }

    /// Build from the entries of a `components` array.
    ///
    /// Disabled entries and unrecognized `type`s are skipped.
    pub fn from_components(specs: &[ComponentSpec]) -> ComponentFactory {
        let mut directives: Vec<Directive> = Vec::with_capacity(specs.len());
        for spec in specs.iter() {
            if !spec.enabled {
                defo!("skip disabled component {:?}", spec.kind);
                continue;
            }
            match spec.kind.as_str() {
                "timestamp" => directives.push(Directive::Timestamp),
                "level" => directives.push(Directive::Level),
                "tid" => directives.push(Directive::ThreadId),
                "loc" => directives.push(Directive::SourceLocation(
                    spec.format
                        .clone()
                        .unwrap_or_default(),
                )),
                "msg" => directives.push(Directive::Message),
                "color" => directives.push(Directive::Color(
                    spec.level_colors
                        .clone()
                        .unwrap_or_default(),
                )),
                _unknown => {
                    defo!("skip unrecognized component type {:?}", spec.kind);
                }
            }
        }

        ComponentFactory { directives }
    }

    /// Build from a `%`-pattern string.
    ///
    /// Letters: `t`=Timestamp, `p`=Level, `i`=ThreadId,
    /// `f`=`{file_name}`, `n`=`{function_name}`, `l`=`{line}`, `m`=Message.
    /// Runs of other text become literal [`Directive::Text`] entries.
    /// Unknown letters after a `%` emit nothing; a `%` followed by a
    /// non-letter drops the `%` and the non-letter is re-examined as
    /// normal text.
    pub fn from_pattern(pattern: &str) -> ComponentFactory {
        defn!("({:?})", pattern);
        let mut directives: Vec<Directive> = Vec::new();
        let mut literal: String = String::new();
        let mut state: PatternState = PatternState::NormalText;

        let chars: Vec<char> = pattern.chars().collect();
        let mut at: usize = 0;
        while at < chars.len() {
            let c: char = chars[at];
            match state {
                PatternState::NormalText => {
                    if c == '%' {
                        if !literal.is_empty() {
                            directives.push(Directive::Text(std::mem::take(&mut literal)));
                        }
                        state = PatternState::PatternChar;
                    } else {
                        literal.push(c);
                    }
                    at += 1;
                }
                PatternState::PatternChar => {
                    state = PatternState::NormalText;
                    if !c.is_ascii_alphabetic() {
                        // dropped the `%`; do not consume, `c` is
                        // re-examined as normal text
                        continue;
                    }
                    match c {
                        't' => directives.push(Directive::Timestamp),
                        'p' => directives.push(Directive::Level),
                        'i' => directives.push(Directive::ThreadId),
                        'f' => directives.push(Directive::SourceLocation(
                            LOC_PLACEHOLDER_FILE_NAME.to_string(),
                        )),
                        'n' => directives.push(Directive::SourceLocation(
                            LOC_PLACEHOLDER_FUNCTION_NAME.to_string(),
                        )),
                        'l' => directives.push(Directive::SourceLocation(
                            LOC_PLACEHOLDER_LINE.to_string(),
                        )),
                        'm' => directives.push(Directive::Message),
                        _unknown => {
                            defo!("unknown pattern letter {:?}; emit nothing", c);
                        }
                    }
                    at += 1;
                }
            }
        }
        if !literal.is_empty() {
            directives.push(Directive::Text(literal));
        }
        defx!("({:?}) {} directives", pattern, directives.len());

        ComponentFactory { directives }
    }

    /// The ordered rendering plan.
    #[inline(always)]
    pub fn directives(&self) -> &[Directive] {
        self.directives.as_slice()
    }

    /// The `Color` directive's map, if the plan has one.
    pub fn level_colors(&self) -> Option<&LevelColorMap> {
        for directive in self.directives.iter() {
            if let Directive::Color(map) = directive {
                return Some(map);
            }
        }

        None
    }

    /// Returns `true` if any `loc` directive's template references
    /// `placeholder` (used by the WebSocket sink to gate loc subfields).
    pub fn loc_references(
        &self,
        placeholder: &str,
    ) -> bool {
        for directive in self.directives.iter() {
            if let Directive::SourceLocation(template) = directive {
                if template.contains(placeholder) {
                    return true;
                }
            }
        }

        false
    }
}
