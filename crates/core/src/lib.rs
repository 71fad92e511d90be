pub mod clock;
pub mod error;
pub mod grouping;
pub mod locale;
pub mod markup;
pub mod message;
pub mod relative;
pub mod timeline;
pub mod timestamp;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::FormatError;
pub use grouping::{
    group, AnnotatedMessage, Annotation, MessageOrder, TimelineAnnotations, TimelineGrouper,
    DEFAULT_SEQUENTIAL_WINDOW_SECS,
};
pub use locale::{resolve_locale, EnUs, LocaleFormatter, PosixLocale};
pub use message::{Message, RawTimestamp};
pub use timeline::{build_entries, ListContext, ListStatus, TimelineEntry};
pub use timestamp::{FormatSelector, TimestampFormatter};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
