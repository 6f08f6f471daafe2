pub(crate) mod text;

pub(crate) use text::preview_text;
