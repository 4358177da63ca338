// src/format/mod.rs

//! Rendering of a [`LogEvent`] to text.
//!
//! ## Overview
//!
//! * A [`ComponentFactory`] builds an ordered list of [`Directive`]s from
//!   the settings JSON document or from a `%`-pattern string.
//! * A [`Formatter`] walks that list to render one event to one string.
//! * The [`color`] helpers turn color names into ANSI truecolor escapes
//!   that the `Color` directive splices around the level and message.
//!
//! Every sink owns one `Formatter`; a `Formatter` is cheap to clone
//! (the directive list is shared).
//!
//! [`LogEvent`]: crate::data::event::LogEvent
//! [`ComponentFactory`]: crate::format::factory::ComponentFactory
//! [`Directive`]: crate::format::directive::Directive
//! [`Formatter`]: crate::format::formatter::Formatter
//! [`color`]: crate::format::color

pub mod color;
pub mod directive;
pub mod factory;
pub mod formatter;
