//! Event-stream rewriting over pulldown-cmark. Each transformer wraps an
//! inner event iterator and rewrites the events it cares about; the heading
//! anchor transformer, for instance, buffers a whole heading and re-emits it
//! with a unique id and a permalink.
use pulldown_cmark::Event;

pub mod anchor;

/// An event iterator built around an inner one.
pub trait Transformer<'a, I>: Iterator<Item = Event<'a>> + Sized
where
    I: Iterator<Item = Event<'a>>,
{
    fn transform(inner: I) -> Self;
}

/// Chain transformers onto any event iterator.
pub trait WithTransformer<'a>: Iterator<Item = Event<'a>> + Sized {
    fn with_transformer<T: Transformer<'a, Self>>(self) -> T {
        T::transform(self)
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> WithTransformer<'a> for I {}
