use std::fmt::{Display, Write};
use std::ops::ControlFlow;

use crate::collector::Collector;

/// A [`Collector`] that renders elements with [`Display`] and joins them
/// with a separator, optionally wrapped in a prefix and suffix.
///
/// # Examples
///
/// ```
/// use rill::{Pipeline, collector::Joining};
///
/// let majors = Pipeline::from(["CS", "Math", "Physics"])
///     .collect(Joining::new(" | ").wrap("[", "]"))?;
/// assert_eq!(majors, "[CS | Math | Physics]");
/// # Ok::<_, rill::PipelineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Joining {
    sep: String,
    prefix: String,
    suffix: String,
}

impl Joining {
    /// Creates a new instance of this collector with the given separator.
    pub fn new(sep: impl Into<String>) -> Self {
        Self {
            sep: sep.into(),
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    /// Adds a prefix and suffix around the joined output.
    pub fn wrap(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.suffix = suffix.into();
        self
    }
}

impl<T> Collector<T> for Joining
where
    T: Display,
{
    // `None` distinguishes "nothing yet" from "one empty rendering", so
    // separators land only between elements.
    type Accum = Option<String>;
    type Output = String;

    fn supply(&self) -> Self::Accum {
        None
    }

    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        let buf = match acc {
            Some(buf) => {
                buf.push_str(&self.sep);
                buf
            }
            None => acc.insert(String::new()),
        };
        // Writing into a `String` is infallible.
        let _ = write!(buf, "{item}");
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        match (left, right) {
            (Some(mut l), Some(r)) => {
                l.push_str(&self.sep);
                l.push_str(&r);
                Some(l)
            }
            (l, r) => l.or(r),
        }
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        let mut out = self.prefix.clone();
        out.push_str(&acc.unwrap_or_default());
        out.push_str(&self.suffix);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_join_is_just_the_affixes() {
        let c = Joining::new(", ").wrap("<", ">");
        assert_eq!(
            <Joining as Collector<i32>>::finish(&c, <Joining as Collector<i32>>::supply(&c)),
            "<>"
        );
    }

    #[test]
    fn combine_inserts_a_separator_between_halves() {
        let c = Joining::new("-");
        let mut left = <Joining as Collector<&str>>::supply(&c);
        let mut right = <Joining as Collector<&str>>::supply(&c);
        let _ = c.accumulate(&mut left, "a");
        let _ = c.accumulate(&mut right, "b");
        let _ = c.accumulate(&mut right, "c");
        assert_eq!(
            <Joining as Collector<&str>>::finish(
                &c,
                <Joining as Collector<&str>>::combine(&c, left, right)
            ),
            "a-b-c"
        );
    }
}
