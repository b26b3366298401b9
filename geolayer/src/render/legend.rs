//! Map legend.

use indexmap::IndexMap;

/// Ordered `(label, color)` pairs collected while layers are added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegendAccumulator {
    pairs: Vec<(String, String)>,
}

impl LegendAccumulator {
    /// Appends one pair.
    pub fn push(&mut self, label: impl Into<String>, color: impl Into<String>) {
        self.pairs.push((label.into(), color.into()));
    }

    /// Appends pairs in order.
    pub fn extend<L, C>(&mut self, pairs: impl IntoIterator<Item = (L, C)>)
    where
        L: Into<String>,
        C: Into<String>,
    {
        self.pairs
            .extend(pairs.into_iter().map(|(l, c)| (l.into(), c.into())));
    }

    /// Collected pairs, duplicates included.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Number of collected pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Collapses the pairs into a legend.
    ///
    /// A repeated label keeps the position of its first occurrence and the color of its last.
    pub fn into_legend(self, title: impl Into<String>) -> Legend {
        let mut entries = IndexMap::with_capacity(self.pairs.len());
        for (label, color) in self.pairs {
            entries.insert(label, color);
        }

        Legend {
            title: title.into(),
            entries,
        }
    }
}

/// Label to color mapping shown on the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Legend {
    title: String,
    entries: IndexMap<String, String>,
}

impl Legend {
    /// Legend title. May be empty.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Entries in display order. Colors are stored as they were given.
    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    /// Color of an entry in CSS form.
    pub fn css_color(color: &str) -> String {
        if color.starts_with('#') {
            color.to_string()
        } else {
            format!("#{color}")
        }
    }
}
