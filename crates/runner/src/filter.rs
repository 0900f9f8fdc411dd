//! Tag-based section selection

use std::collections::BTreeSet;

use crate::spec::Section;

/// Include/exclude tag filter.
///
/// A section runs when it is included (no include tags, or it carries one of
/// them) and not excluded (it carries none of the exclude tags). Exclusion
/// wins when both apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl TagFilter {
    pub fn new(include: BTreeSet<String>, exclude: BTreeSet<String>) -> Self {
        Self { include, exclude }
    }

    pub fn accepts(&self, tags: &BTreeSet<String>) -> bool {
        let included = self.include.is_empty() || !self.include.is_disjoint(tags);
        let excluded = !self.exclude.is_disjoint(tags);
        included && !excluded
    }

    /// Sections this filter accepts, in their original order
    pub fn apply<'a, I>(&self, sections: I) -> Vec<&'a Section>
    where
        I: IntoIterator<Item = &'a Section>,
    {
        sections
            .into_iter()
            .filter(|s| self.accepts(s.tags()))
            .collect()
    }
}

/// Filter sections by include and exclude tags
pub fn filter_sections<'a>(
    sections: &'a [Section],
    include: &BTreeSet<String>,
    exclude: &BTreeSet<String>,
) -> Vec<&'a Section> {
    TagFilter::new(include.clone(), exclude.clone()).apply(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn tags(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn section(name: &str, section_tags: &[&str]) -> Section {
        Section {
            name: name.to_string(),
            tags: tags(section_tags),
            checks: Vec::new(),
        }
    }

    fn sections() -> Vec<Section> {
        vec![
            section("a", &["A"]),
            section("ab", &["A", "B"]),
            section("b", &["B"]),
            section("none", &[]),
        ]
    }

    fn names(selected: &[&Section]) -> Vec<String> {
        selected.iter().map(|s| s.name.clone()).collect()
    }

    #[test_case(&[], &[], &["a", "ab", "b", "none"] ; "no filtering")]
    #[test_case(&["A"], &[], &["a", "ab"] ; "include only")]
    #[test_case(&["A"], &["B"], &["a"] ; "exclude wins")]
    #[test_case(&[], &["B"], &["a", "none"] ; "exclude only")]
    #[test_case(&["C"], &[], &[] ; "include unknown tag")]
    #[test_case(&["A", "B"], &[], &["a", "ab", "b"] ; "include any of")]
    fn test_filter(include: &[&str], exclude: &[&str], expected: &[&str]) {
        let all = sections();
        let selected = filter_sections(&all, &tags(include), &tags(exclude));
        assert_eq!(names(&selected), expected);
    }

    #[test]
    fn test_filtering_in_two_passes_matches_one_pass() {
        let all = sections();
        let cases = [
            (tags(&["A"]), tags(&["B"])),
            (tags(&[]), tags(&["A"])),
            (tags(&["B"]), tags(&[])),
        ];
        for (include, exclude) in cases {
            let first = TagFilter::new(include.clone(), BTreeSet::new()).apply(&all);
            let two_pass = TagFilter::new(BTreeSet::new(), exclude.clone()).apply(first);
            let one_pass = filter_sections(&all, &include, &exclude);
            assert_eq!(names(&two_pass), names(&one_pass));
        }
    }
}
