//! Run listing filters

use serde::{Deserialize, Serialize};

/// Criteria for listing runs.
///
/// Every populated field narrows the listing; list fields match any of their
/// values. `offset` and `size` page through the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFilter {
    pub ids: Vec<u64>,
    pub tasks: Vec<u64>,
    pub uploaders: Vec<u64>,
    pub flows: Vec<u64>,
    pub tag: Option<String>,
    pub offset: Option<u64>,
    pub size: Option<u64>,
}

impl RunFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.ids.extend(ids);
        self
    }

    pub fn tasks(mut self, tasks: impl IntoIterator<Item = u64>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    pub fn uploaders(mut self, uploaders: impl IntoIterator<Item = u64>) -> Self {
        self.uploaders.extend(uploaders);
        self
    }

    pub fn flows(mut self, flows: impl IntoIterator<Item = u64>) -> Self {
        self.flows.extend(flows);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// True when no selection criterion is set; paging alone does not count
    pub fn is_unfiltered(&self) -> bool {
        self.ids.is_empty()
            && self.tasks.is_empty()
            && self.uploaders.is_empty()
            && self.flows.is_empty()
            && self.tag.is_none()
    }

    /// Request path segments, relative to the API root. Each entry is one
    /// segment, so a tag is never split.
    pub fn path_segments(&self) -> Vec<String> {
        let mut segments = vec!["run".to_string(), "list".to_string()];
        for (name, values) in [
            ("run", &self.ids),
            ("task", &self.tasks),
            ("uploader", &self.uploaders),
            ("flow", &self.flows),
        ] {
            if !values.is_empty() {
                let joined: Vec<String> = values.iter().map(u64::to_string).collect();
                segments.push(name.to_string());
                segments.push(joined.join(","));
            }
        }
        if let Some(tag) = &self.tag {
            segments.push("tag".to_string());
            segments.push(tag.clone());
        }
        if let Some(offset) = self.offset {
            segments.push("offset".to_string());
            segments.push(offset.to_string());
        }
        if let Some(size) = self.size {
            segments.push("limit".to_string());
            segments.push(size.to_string());
        }
        segments
    }

    /// Request path for display and logging
    pub fn to_path(&self) -> String {
        self.path_segments().join("/")
    }

    /// The same filter, advanced by one page of `size`
    pub fn next_page(&self) -> Option<Self> {
        let size = self.size?;
        Some(Self {
            offset: Some(self.offset.unwrap_or(0) + size),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segments_in_order() {
        let filter = RunFilter::new()
            .tag("study_14")
            .flows([5])
            .uploaders([29, 274])
            .tasks([20, 21])
            .ids([2])
            .offset(10)
            .size(100);
        assert_eq!(
            filter.to_path(),
            "run/list/run/2/task/20,21/uploader/29,274/flow/5/tag/study_14/offset/10/limit/100"
        );
    }

    #[test]
    fn test_empty_filter_path() {
        let filter = RunFilter::new();
        assert!(filter.is_unfiltered());
        assert_eq!(filter.to_path(), "run/list");
        assert!(RunFilter::new().size(10).is_unfiltered());
    }

    #[test]
    fn test_tag_stays_one_segment() {
        let segments = RunFilter::new().tag("a/b").path_segments();
        assert_eq!(segments, vec!["run", "list", "tag", "a/b"]);
    }

    #[test]
    fn test_next_page() {
        let filter = RunFilter::new().tasks([1]).size(50);
        let next = filter.next_page().unwrap();
        assert_eq!(next.offset, Some(50));
        assert_eq!(next.next_page().unwrap().offset, Some(100));
        assert!(RunFilter::new().next_page().is_none());
    }
}
