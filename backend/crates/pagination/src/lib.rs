//! Offset pagination primitives shared by backend list endpoints.
//!
//! The crate stays free of transport and storage concerns. Inbound adapters
//! parse raw query parameters into a [`PageRequest`] and a [`SortDirection`],
//! repositories translate them into `OFFSET`/`LIMIT` clauses, and the
//! resulting rows travel back to clients inside a [`Page`] envelope.
//!
//! # Examples
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(1, 2).expect("valid request");
//! assert_eq!(request.offset(), 2);
//!
//! let page = Page::new(vec!["c", "d"], request, 5);
//! assert_eq!(page.total_pages, 3);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised while validating pagination input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Page size was zero.
    #[error("page size must be at least 1")]
    ZeroSize,
    /// Page size exceeded [`MAX_PAGE_SIZE`].
    #[error("page size must be at most {max}")]
    SizeTooLarge {
        /// Maximum accepted page size.
        max: u32,
    },
    /// Page index was negative.
    #[error("page index must not be negative")]
    NegativePage,
    /// Page index did not fit the supported range.
    #[error("page index is out of range")]
    PageOutOfRange,
}

/// Zero-based page index plus page size.
///
/// ## Invariants
/// - `1 <= size <= MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Validate and construct a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `size` is zero or above
    /// [`MAX_PAGE_SIZE`].
    pub const fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if size == 0 {
            return Err(PageRequestError::ZeroSize);
        }
        if size > MAX_PAGE_SIZE {
            return Err(PageRequestError::SizeTooLarge { max: MAX_PAGE_SIZE });
        }
        Ok(Self { page, size })
    }

    /// Build a request from signed query parameters, rejecting negatives.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::NegativePage`] for a negative page index
    /// and the [`PageRequest::new`] errors for an invalid size.
    pub fn from_signed(page: i64, size: i64) -> Result<Self, PageRequestError> {
        let page = u32::try_from(page).map_err(|_| {
            if page < 0 {
                PageRequestError::NegativePage
            } else {
                PageRequestError::PageOutOfRange
            }
        })?;
        if size <= 0 {
            return Err(PageRequestError::ZeroSize);
        }
        let size =
            u32::try_from(size).map_err(|_| PageRequestError::SizeTooLarge { max: MAX_PAGE_SIZE })?;
        Self::new(page, size)
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of items skipped before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Ordering applied to the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

/// Error returned when a sort direction string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sort direction must be asc or desc, got {value}")]
pub struct ParseSortDirectionError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for SortDirection {
    type Err = ParseSortDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(ParseSortDirectionError {
                value: s.to_owned(),
            })
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in query order.
    pub content: Vec<T>,
    /// Zero-based page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Number of items matching the query across all pages.
    pub total_elements: u64,
    /// Number of pages needed to hold `total_elements`.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap `content` fetched for `request` out of `total_elements` matches.
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page(),
            size: request.size(),
            total_elements,
            total_pages: total_elements.div_ceil(u64::from(request.size())),
        }
    }

    /// Convert every item while keeping the paging metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
