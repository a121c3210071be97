//! Resize targets - the consumer shapes the manager can write to.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::PositionError;
use crate::store::{Store, Writable};

/// Content and offset dimensions delivered to resize targets.
///
/// `None` means "not measured". A target that is detached receives one final
/// all-`None` update so it can drop stale measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResizeData {
    pub content_width: Option<f64>,
    pub content_height: Option<f64>,
    pub offset_width: Option<f64>,
    pub offset_height: Option<f64>,
}

impl ResizeData {
    /// Derive offset dimensions from content dimensions plus border/padding.
    pub fn from_content(
        content_width: Option<f64>,
        content_height: Option<f64>,
        additional_width: f64,
        additional_height: f64,
    ) -> Self {
        Self {
            content_width,
            content_height,
            offset_width: content_width.map(|width| width + additional_width),
            offset_height: content_height.map(|height| height + additional_height),
        }
    }

    /// Every dimension cleared.
    #[inline]
    pub fn cleared() -> Self {
        Self::default()
    }
}

pub type ResizeCallback = Rc<dyn Fn(&ResizeData)>;
pub type PairCallback = Rc<dyn Fn(Option<f64>, Option<f64>)>;
pub type PositionalCallback = Rc<dyn Fn(Option<f64>, Option<f64>, Option<f64>, Option<f64>)>;

// =============================================================================
// ResizeTarget
// =============================================================================

/// Where resize measurements go.
///
/// The caller names the shape at registration. Variants are listed in
/// precedence order, which matters only for [`ResizeCapabilities`].
#[derive(Clone)]
pub enum ResizeTarget {
    /// Receives the full record.
    Callback(ResizeCallback),
    /// Receives `(offset_width, offset_height)`.
    Dimension(PairCallback),
    /// Receives `(content_width, content_height)`.
    ContentBounds(PairCallback),
    /// Fields are written directly.
    Data(Rc<RefCell<ResizeData>>),
    /// Invoked as `(offset_width, offset_height, content_width, content_height)`.
    Function(PositionalCallback),
    /// Merged into a writable store.
    Store(Store<ResizeData>),
}

impl ResizeTarget {
    pub fn callback(f: impl Fn(&ResizeData) + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }

    pub fn dimension(f: impl Fn(Option<f64>, Option<f64>) + 'static) -> Self {
        Self::Dimension(Rc::new(f))
    }

    pub fn content_bounds(f: impl Fn(Option<f64>, Option<f64>) + 'static) -> Self {
        Self::ContentBounds(Rc::new(f))
    }

    pub fn function(f: impl Fn(Option<f64>, Option<f64>, Option<f64>, Option<f64>) + 'static) -> Self {
        Self::Function(Rc::new(f))
    }

    /// Same underlying consumer?
    pub fn same(&self, other: &ResizeTarget) -> bool {
        match (self, other) {
            (Self::Callback(a), Self::Callback(b)) => thin(a) == thin(b),
            (Self::Dimension(a), Self::Dimension(b)) => thin(a) == thin(b),
            (Self::ContentBounds(a), Self::ContentBounds(b)) => thin(a) == thin(b),
            (Self::Data(a), Self::Data(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => thin(a) == thin(b),
            (Self::Store(a), Self::Store(b)) => a == b,
            _ => false,
        }
    }

    /// Deliver one measurement.
    pub(crate) fn deliver(&self, data: &ResizeData) {
        match self {
            Self::Callback(f) => f(data),
            Self::Dimension(f) => f(data.offset_width, data.offset_height),
            Self::ContentBounds(f) => f(data.content_width, data.content_height),
            Self::Data(cell) => *cell.borrow_mut() = *data,
            Self::Function(f) => f(
                data.offset_width,
                data.offset_height,
                data.content_width,
                data.content_height,
            ),
            Self::Store(store) => store.update(|current| {
                current.content_width = data.content_width;
                current.content_height = data.content_height;
                current.offset_width = data.offset_width;
                current.offset_height = data.offset_height;
            }),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Callback(_) => "callback",
            Self::Dimension(_) => "dimension",
            Self::ContentBounds(_) => "content-bounds",
            Self::Data(_) => "data",
            Self::Function(_) => "function",
            Self::Store(_) => "store",
        }
    }
}

fn thin<T: ?Sized>(rc: &Rc<T>) -> *const () {
    Rc::as_ptr(rc) as *const ()
}

impl fmt::Debug for ResizeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResizeTarget::{}", self.kind())
    }
}

impl From<Store<ResizeData>> for ResizeTarget {
    fn from(store: Store<ResizeData>) -> Self {
        Self::Store(store)
    }
}

impl From<Rc<RefCell<ResizeData>>> for ResizeTarget {
    fn from(data: Rc<RefCell<ResizeData>>) -> Self {
        Self::Data(data)
    }
}

// =============================================================================
// ResizeCapabilities
// =============================================================================

/// A consumer offering several capabilities at once.
///
/// Converting to a [`ResizeTarget`] picks the first capability present in
/// precedence order: `resize_observed`, `set_dimension`, `set_content_bounds`,
/// `data`, `function`, `store`. A consumer offering none of them is rejected.
#[derive(Default, Clone)]
pub struct ResizeCapabilities {
    pub resize_observed: Option<ResizeCallback>,
    pub set_dimension: Option<PairCallback>,
    pub set_content_bounds: Option<PairCallback>,
    pub data: Option<Rc<RefCell<ResizeData>>>,
    pub function: Option<PositionalCallback>,
    pub store: Option<Store<ResizeData>>,
}

impl TryFrom<ResizeCapabilities> for ResizeTarget {
    type Error = PositionError;

    fn try_from(caps: ResizeCapabilities) -> Result<Self, Self::Error> {
        if let Some(f) = caps.resize_observed {
            return Ok(Self::Callback(f));
        }
        if let Some(f) = caps.set_dimension {
            return Ok(Self::Dimension(f));
        }
        if let Some(f) = caps.set_content_bounds {
            return Ok(Self::ContentBounds(f));
        }
        if let Some(data) = caps.data {
            return Ok(Self::Data(data));
        }
        if let Some(f) = caps.function {
            return Ok(Self::Function(f));
        }
        if let Some(store) = caps.store {
            return Ok(Self::Store(store));
        }
        Err(PositionError::InvalidTarget)
    }
}
