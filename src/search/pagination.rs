use std::fmt;

/// Page counts up to this size are shown in full, without ellipses
pub const PAGE_WINDOW: u32 = 5;

/// One element of the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    /// Always rendered; disabled on the first page
    Previous { enabled: bool },
    Page { number: u32, current: bool },
    Ellipsis,
    /// Always rendered; disabled on the last page
    Next { enabled: bool },
}

/// Build the pagination bar for `current` out of `total` pages. Returns
/// nothing when there is at most one page.
pub fn page_controls(current: u32, total: u32) -> Vec<PageControl> {
    if total <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total);

    let mut controls = vec![PageControl::Previous {
        enabled: current > 1,
    }];
    controls.extend(
        visible_pages(current, total)
            .into_iter()
            .map(|slot| match slot {
                Some(number) => PageControl::Page {
                    number,
                    current: number == current,
                },
                None => PageControl::Ellipsis,
            }),
    );
    controls.push(PageControl::Next {
        enabled: current < total,
    });
    controls
}

/// Page numbers to show, with `None` standing for an ellipsis.
pub fn visible_pages(current: u32, total: u32) -> Vec<Option<u32>> {
    if total <= 1 {
        return Vec::new();
    }
    if total <= PAGE_WINDOW {
        return (1..=total).map(Some).collect();
    }
    let current = current.clamp(1, total);

    let mut pages = vec![Some(1)];
    if current > 3 {
        pages.push(None);
    }
    // The window stays three pages wide at either end of the range.
    let mut start = current.saturating_sub(1).max(2);
    let mut end = current.saturating_add(1).min(total - 1);
    if current == 1 {
        end = (total - 1).min(3);
    }
    if current == total {
        start = total.saturating_sub(2).max(2);
    }
    pages.extend((start..=end).map(Some));
    if current.saturating_add(2) < total {
        pages.push(None);
    }
    pages.push(Some(total));
    pages
}

/// Terminal rendering of a pagination bar, e.g. `‹ 1 … 4 [5] 6 … 10 ›`
pub struct PageBar<'a>(pub &'a [PageControl]);

impl fmt::Display for PageBar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|control| match control {
                PageControl::Previous { enabled: true } => "‹".to_string(),
                PageControl::Previous { enabled: false } => "·".to_string(),
                PageControl::Next { enabled: true } => "›".to_string(),
                PageControl::Next { enabled: false } => "·".to_string(),
                PageControl::Ellipsis => "…".to_string(),
                PageControl::Page {
                    number,
                    current: true,
                } => format!("[{number}]"),
                PageControl::Page { number, .. } => number.to_string(),
            })
            .collect();
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_renders_nothing() {
        assert!(page_controls(1, 1).is_empty());
        assert!(page_controls(1, 0).is_empty());
    }

    #[test]
    fn small_totals_show_every_page() {
        assert_eq!(visible_pages(2, 4), vec![Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(visible_pages(5, 5).len(), 5);
    }

    #[test]
    fn first_page_of_ten() {
        assert_eq!(
            visible_pages(1, 10),
            vec![Some(1), Some(2), Some(3), None, Some(10)]
        );
    }

    #[test]
    fn middle_page_of_ten() {
        assert_eq!(
            visible_pages(5, 10),
            vec![Some(1), None, Some(4), Some(5), Some(6), None, Some(10)]
        );
    }

    #[test]
    fn near_the_ends_of_ten() {
        assert_eq!(
            visible_pages(3, 10),
            vec![Some(1), Some(2), Some(3), Some(4), None, Some(10)]
        );
        assert_eq!(
            visible_pages(8, 10),
            vec![Some(1), None, Some(7), Some(8), Some(9), Some(10)]
        );
        assert_eq!(
            visible_pages(10, 10),
            vec![Some(1), None, Some(8), Some(9), Some(10)]
        );
    }

    #[test]
    fn last_pages_of_largest_total() {
        let max = u32::MAX;
        assert_eq!(
            visible_pages(max, max),
            vec![Some(1), None, Some(max - 2), Some(max - 1), Some(max)]
        );
        assert_eq!(
            visible_pages(max - 1, max),
            vec![Some(1), None, Some(max - 2), Some(max - 1), Some(max)]
        );
        assert_eq!(
            page_controls(max, max).last(),
            Some(&PageControl::Next { enabled: false })
        );
    }

    #[test]
    fn prev_and_next_are_always_present() {
        let first = page_controls(1, 10);
        assert_eq!(first.first(), Some(&PageControl::Previous { enabled: false }));
        assert_eq!(first.last(), Some(&PageControl::Next { enabled: true }));

        let last = page_controls(4, 4);
        assert_eq!(last.first(), Some(&PageControl::Previous { enabled: true }));
        assert_eq!(last.last(), Some(&PageControl::Next { enabled: false }));
    }

    #[test]
    fn renders_for_terminal() {
        let controls = page_controls(5, 10);
        assert_eq!(PageBar(&controls).to_string(), "‹ 1 … 4 [5] 6 … 10 ›");
    }
}
