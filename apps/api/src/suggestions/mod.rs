// Suggestions: synthetic fragments closing a scope's keyword gaps.
// Text generation sits behind `SuggestionWriter`; nothing here calls a model.

pub mod generator;
pub mod phrasing;
