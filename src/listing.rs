//! Search, sort and paging for the student list.
//!
//! A listing request is resolved into a [`ListQueryState`], which [`compose`] turns into an
//! ordered view over every student in the store. [`Page::of`] then cuts that view down to the
//! page being shown.

use crate::data::{
    store::{StoreError, StudentStore},
    student::Student,
};
use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    DateAsc,
    DateDesc,
}

/// The two column-header links offered alongside a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortToggles {
    pub name: SortKey,
    pub date: SortKey,
}

/// Current sort → what the "Last Name" and "Enrollment Date" headers link to next.
const SORT_TOGGLES: [(SortKey, SortToggles); 4] = [
    (
        SortKey::NameAsc,
        SortToggles {
            name: SortKey::NameDesc,
            date: SortKey::DateAsc,
        },
    ),
    (
        SortKey::NameDesc,
        SortToggles {
            name: SortKey::NameAsc,
            date: SortKey::DateAsc,
        },
    ),
    (
        SortKey::DateAsc,
        SortToggles {
            name: SortKey::NameAsc,
            date: SortKey::DateDesc,
        },
    ),
    (
        SortKey::DateDesc,
        SortToggles {
            name: SortKey::NameAsc,
            date: SortKey::DateAsc,
        },
    ),
];

impl SortKey {
    /// Anything unrecognised (or nothing at all) sorts by ascending last name.
    pub fn from_param(sort_order: Option<&str>) -> Self {
        match sort_order {
            Some("name-desc") => Self::NameDesc,
            Some("Date") => Self::DateAsc,
            Some("date-desc") => Self::DateDesc,
            _ => Self::NameAsc,
        }
    }

    /// The `sortOrder` value that selects this key. The default has no value of its own.
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::NameAsc => "",
            Self::NameDesc => "name-desc",
            Self::DateAsc => "Date",
            Self::DateDesc => "date-desc",
        }
    }

    pub fn toggles(self) -> SortToggles {
        SORT_TOGGLES
            .iter()
            .find_map(|(key, toggles)| (*key == self).then_some(*toggles))
            .unwrap_or(SortToggles {
                name: Self::NameDesc,
                date: Self::DateAsc,
            })
    }
}

/// Raw listing parameters, named as they appear on the query string.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQueryState {
    pub sort_key: SortKey,
    pub filter_text: Option<String>,
    pub page_number: usize,
}

impl ListQueryState {
    /// A freshly submitted search replaces the remembered filter and starts again from page 1.
    /// Otherwise the remembered filter sticks and the requested page is used.
    pub fn resolve(params: &ListingParams) -> Self {
        let sort_key = SortKey::from_param(params.sort_order.as_deref());

        let (filter_text, page_number) = match &params.search_string {
            Some(search) => (Some(search.clone()), 1),
            None => (params.current_filter.clone(), params.page.unwrap_or(1)),
        };

        Self {
            sort_key,
            filter_text: filter_text.filter(|filter| !filter.is_empty()),
            page_number: page_number.max(1),
        }
    }

    /// Parameters that reproduce this listing with a different sort or page.
    pub fn link_params(&self, sort_key: SortKey, page: Option<usize>) -> ListingParams {
        let sort_order = sort_key.as_param();
        ListingParams {
            sort_order: (!sort_order.is_empty()).then(|| sort_order.to_string()),
            current_filter: self.filter_text.clone(),
            search_string: None,
            page,
        }
    }
}

pub fn matches_filter(student: &Student, filter_text: &str) -> bool {
    filter_text.is_empty()
        || student.last_name.contains(filter_text)
        || student.first_mid_name.contains(filter_text)
}

/// Filters by `filter_text` (if any) and sorts by `sort_key`. The sort is stable, so students
/// with equal keys keep the store's order.
pub fn compose(
    students: impl IntoIterator<Item = Student>,
    filter_text: Option<&str>,
    sort_key: SortKey,
) -> Vec<Student> {
    let mut students: Vec<_> = students
        .into_iter()
        .filter(|student| filter_text.is_none_or(|filter| matches_filter(student, filter)))
        .collect();

    match sort_key {
        SortKey::NameAsc => students.sort_by(|a, b| a.last_name.cmp(&b.last_name)),
        SortKey::NameDesc => students.sort_by(|a, b| b.last_name.cmp(&a.last_name)),
        SortKey::DateAsc => students.sort_by_key(|student| student.enrollment_date),
        SortKey::DateDesc => students.sort_by(|a, b| b.enrollment_date.cmp(&a.enrollment_date)),
    }

    students
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// `page_number` is clamped into `1..=total_pages`, and an empty sequence still has one
    /// (empty) page.
    pub fn of(sequence: Vec<T>, page_number: Option<usize>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_items = sequence.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let page_number = page_number.unwrap_or(1).clamp(1, total_pages);

        let items = sequence
            .into_iter()
            .skip((page_number - 1) * page_size)
            .take(page_size)
            .collect();

        Self {
            items,
            page_number,
            total_pages,
            total_items,
        }
    }

    pub const fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub const fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }
}

#[derive(Debug)]
pub struct StudentListing {
    pub state: ListQueryState,
    pub toggles: SortToggles,
    pub page: Page<Student>,
}

pub async fn list_students(
    store: &mut impl StudentStore,
    params: &ListingParams,
) -> Result<StudentListing, StoreError> {
    let mut state = ListQueryState::resolve(params);
    let ordered = compose(
        store.query().await?,
        state.filter_text.as_deref(),
        state.sort_key,
    );
    let page = Page::of(ordered, Some(state.page_number), PAGE_SIZE);
    state.page_number = page.page_number;

    Ok(StudentListing {
        toggles: state.sort_key.toggles(),
        state,
        page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::memory::MemoryStore;
    use time::{Date, Month};

    fn student(id: i32, first: &str, last: &str, enrolled: (i32, u8)) -> Student {
        Student {
            id,
            last_name: last.to_string(),
            first_mid_name: first.to_string(),
            email_address: format!("{}@example.com", first.to_lowercase()),
            enrollment_date: Date::from_calendar_date(
                enrolled.0,
                Month::try_from(enrolled.1).expect("valid month"),
                1,
            )
            .expect("valid date"),
        }
    }

    fn roster() -> Vec<Student> {
        vec![
            student(1, "Carson", "Alexander", (2005, 9)),
            student(2, "Meredith", "Alonso", (2002, 9)),
            student(3, "Arturo", "Anand", (2003, 9)),
            student(4, "Gytis", "Barzdukas", (2002, 9)),
            student(5, "Yan", "Li", (2002, 9)),
            student(6, "Peggy", "Justice", (2001, 9)),
            student(7, "Laura", "Norman", (2003, 9)),
        ]
    }

    fn params(
        sort_order: Option<&str>,
        current_filter: Option<&str>,
        search_string: Option<&str>,
        page: Option<usize>,
    ) -> ListingParams {
        ListingParams {
            sort_order: sort_order.map(String::from),
            current_filter: current_filter.map(String::from),
            search_string: search_string.map(String::from),
            page,
        }
    }

    #[test]
    fn toggle_table_matches_header_links() {
        assert_eq!(SortKey::from_param(None), SortKey::NameAsc);
        assert_eq!(SortKey::from_param(Some("nonsense")), SortKey::NameAsc);
        assert_eq!(SortKey::NameAsc.toggles().name.as_param(), "name-desc");
        assert_eq!(SortKey::NameDesc.toggles().name.as_param(), "");
        assert_eq!(SortKey::DateAsc.toggles().date.as_param(), "date-desc");
        assert_eq!(SortKey::DateDesc.toggles().date.as_param(), "Date");

        assert_eq!(SortKey::NameAsc.toggles().date, SortKey::DateAsc);
        assert_eq!(SortKey::NameDesc.toggles().date, SortKey::DateAsc);
        assert_eq!(SortKey::DateAsc.toggles().name, SortKey::NameAsc);
    }

    #[test]
    fn every_sort_key_round_trips_through_its_param() {
        for (key, _) in SORT_TOGGLES {
            let param = key.as_param();
            let parsed = SortKey::from_param((!param.is_empty()).then_some(param));
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn filter_matches_either_name_and_is_case_sensitive() {
        let filtered = compose(roster(), Some("an"), SortKey::NameAsc);
        let ids: Vec<_> = filtered.iter().map(|s| s.id).collect();
        // Alexander, Anand and Norman by last name, Yan Li by first name
        assert_eq!(ids, vec![1, 3, 5, 7]);

        for s in roster() {
            let included = filtered.iter().any(|f| f.id == s.id);
            assert_eq!(
                included,
                s.last_name.contains("an") || s.first_mid_name.contains("an")
            );
        }

        assert!(compose(roster(), Some("AN"), SortKey::NameAsc).is_empty());
        assert_eq!(compose(roster(), Some("Ar"), SortKey::NameAsc)[0].id, 3);
    }

    #[test]
    fn empty_or_absent_filter_keeps_everyone() {
        assert_eq!(compose(roster(), None, SortKey::NameAsc).len(), 7);
        assert_eq!(compose(roster(), Some(""), SortKey::NameAsc).len(), 7);
    }

    #[test]
    fn name_sorts_by_last_name() {
        let names: Vec<_> = compose(roster(), None, SortKey::NameDesc)
            .into_iter()
            .map(|s| s.last_name)
            .collect();
        assert_eq!(
            names,
            vec!["Norman", "Li", "Justice", "Barzdukas", "Anand", "Alonso", "Alexander"]
        );
    }

    #[test]
    fn date_sorts_are_monotonic_and_stable() {
        let ascending = compose(roster(), None, SortKey::DateAsc);
        assert!(
            ascending
                .windows(2)
                .all(|w| w[0].enrollment_date <= w[1].enrollment_date)
        );
        // three students enrolled 2002-09, in store order
        let ids: Vec<_> = ascending.iter().map(|s| s.id).collect();
        assert_eq!(&ids[1..4], &[2, 4, 5]);

        let descending = compose(roster(), None, SortKey::DateDesc);
        assert!(
            descending
                .windows(2)
                .all(|w| w[0].enrollment_date >= w[1].enrollment_date)
        );
    }

    #[test]
    fn first_of_three_pages() {
        let page = Page::of(roster(), Some(1), 3);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn last_page_is_partial() {
        let page = Page::of(roster(), Some(3), 3);
        assert_eq!(page.items.iter().map(|s| s.id).collect::<Vec<_>>(), vec![7]);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn out_of_range_pages_clamp() {
        assert_eq!(Page::of(roster(), Some(0), 3).page_number, 1);
        assert_eq!(Page::of(roster(), Some(99), 3).page_number, 3);
        assert_eq!(Page::of(roster(), None, 3).page_number, 1);

        let empty = Page::of(Vec::<Student>::new(), Some(4), 3);
        assert_eq!(empty.total_pages, 1);
        assert_eq!(empty.page_number, 1);
        assert!(empty.items.is_empty());
        assert!(!empty.has_next() && !empty.has_previous());
    }

    #[test]
    fn new_search_resets_to_first_page() {
        let state = ListQueryState::resolve(&params(None, Some("old"), Some("Al"), Some(3)));
        assert_eq!(state.filter_text.as_deref(), Some("Al"));
        assert_eq!(state.page_number, 1);
    }

    #[test]
    fn remembered_filter_keeps_requested_page() {
        let state = ListQueryState::resolve(&params(Some("Date"), Some("a"), None, Some(2)));
        assert_eq!(state.filter_text.as_deref(), Some("a"));
        assert_eq!(state.page_number, 2);
        assert_eq!(state.sort_key, SortKey::DateAsc);
    }

    #[test]
    fn submitting_an_empty_search_clears_the_filter() {
        let state = ListQueryState::resolve(&params(None, Some("old"), Some(""), Some(2)));
        assert_eq!(state.filter_text, None);
        assert_eq!(state.page_number, 1);
    }

    #[test]
    fn link_params_carry_the_filter_but_not_the_search() {
        let state = ListQueryState::resolve(&params(None, None, Some("Al"), None));
        let link = state.link_params(SortKey::DateDesc, Some(2));
        assert_eq!(
            serde_urlencoded::to_string(&link).expect("serialisable"),
            "sortOrder=date-desc&currentFilter=Al&page=2"
        );
    }

    #[tokio::test]
    async fn new_search_on_page_three_shows_page_one() {
        let mut store = MemoryStore::with_students(roster());
        let listing = list_students(&mut store, &params(None, None, Some("a"), Some(3)))
            .await
            .expect("memory store doesn't fail reads");

        assert_eq!(listing.state.page_number, 1);
        assert_eq!(listing.page.page_number, 1);
        assert!(
            listing
                .page
                .items
                .iter()
                .all(|s| s.last_name.contains('a') || s.first_mid_name.contains('a'))
        );
    }

    #[tokio::test]
    async fn following_the_date_toggle_reverses_the_order() {
        let mut store = MemoryStore::with_students(roster());

        let by_date = list_students(&mut store, &params(Some("Date"), None, None, None))
            .await
            .expect("memory store doesn't fail reads");
        assert_eq!(by_date.toggles.date.as_param(), "date-desc");

        let next = by_date.state.link_params(by_date.toggles.date, None);
        let mut dates = Vec::new();
        for page in 1..=3 {
            let listing = list_students(
                &mut store,
                &ListingParams {
                    page: Some(page),
                    ..next.clone()
                },
            )
            .await
            .expect("memory store doesn't fail reads");
            dates.extend(listing.page.items.into_iter().map(|s| s.enrollment_date));
        }

        assert_eq!(dates.len(), 7);
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn clamped_page_is_reflected_in_state() {
        let mut store = MemoryStore::with_students(roster());
        let listing = list_students(&mut store, &params(None, None, None, Some(10)))
            .await
            .expect("memory store doesn't fail reads");
        assert_eq!(listing.state.page_number, 3);
        assert_eq!(listing.page.items.len(), 1);
    }
}
