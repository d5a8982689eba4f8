pub const MOVIE_ID: &str = "movieId";
pub const REVIEWER_NAME: &str = "reviewerName";
pub const REVIEW_DATE: &str = "reviewDate";
pub const RATING: &str = "rating";
pub const COMMENT: &str = "comment";
pub const ACTOR_NAME: &str = "actorName";
pub const ROLE_NAME: &str = "roleName";

pub const DEFAULT_MOVIES_TABLE: &str = "Movies";
pub const DEFAULT_REVIEWS_TABLE: &str = "Reviews";
pub const DEFAULT_CAST_TABLE: &str = "MovieCast";
pub const DEFAULT_REVIEWER_INDEX: &str = "ReviewerIndex";
pub const DEFAULT_ROLE_INDEX: &str = "roleIx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Movies,
    Reviews,
    Cast,
}

impl TableKind {
    pub fn partition_attribute(self) -> &'static str {
        MOVIE_ID
    }

    pub fn sort_attribute(self) -> Option<&'static str> {
        match self {
            Self::Movies => None,
            Self::Reviews => Some(REVIEWER_NAME),
            Self::Cast => Some(ACTOR_NAME),
        }
    }
}

/// Physical names of the three tables and their secondary indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub movies: String,
    pub reviews: String,
    pub cast: String,
    pub reviewer_index: String,
    pub role_index: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            movies: DEFAULT_MOVIES_TABLE.to_string(),
            reviews: DEFAULT_REVIEWS_TABLE.to_string(),
            cast: DEFAULT_CAST_TABLE.to_string(),
            reviewer_index: DEFAULT_REVIEWER_INDEX.to_string(),
            role_index: DEFAULT_ROLE_INDEX.to_string(),
        }
    }
}

impl TableLayout {
    pub fn table_name(&self, kind: TableKind) -> &str {
        match kind {
            TableKind::Movies => &self.movies,
            TableKind::Reviews => &self.reviews,
            TableKind::Cast => &self.cast,
        }
    }

    pub fn kind_of(&self, table_name: &str) -> Option<TableKind> {
        [TableKind::Movies, TableKind::Reviews, TableKind::Cast]
            .into_iter()
            .find(|kind| self.table_name(*kind) == table_name)
    }

    /// Partition and sort attributes of a secondary index, or `None` when the
    /// name is not one of the configured indexes.
    pub fn index_keys(&self, index_name: &str) -> Option<(&'static str, Option<&'static str>)> {
        if index_name == self.reviewer_index {
            Some((REVIEWER_NAME, Some(MOVIE_ID)))
        } else if index_name == self.role_index {
            Some((MOVIE_ID, Some(ROLE_NAME)))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_deployed_table_names() {
        let layout = TableLayout::default();
        assert_eq!(layout.table_name(TableKind::Movies), "Movies");
        assert_eq!(layout.table_name(TableKind::Reviews), "Reviews");
        assert_eq!(layout.table_name(TableKind::Cast), "MovieCast");
    }

    #[test]
    fn resolves_kind_from_configured_name() {
        let layout = TableLayout {
            reviews: "ReviewsStaging".to_string(),
            ..TableLayout::default()
        };
        assert_eq!(layout.kind_of("ReviewsStaging"), Some(TableKind::Reviews));
        assert_eq!(layout.kind_of("Reviews"), None);
    }

    #[test]
    fn index_keys_follow_index_definitions() {
        let layout = TableLayout::default();
        assert_eq!(
            layout.index_keys("ReviewerIndex"),
            Some((REVIEWER_NAME, Some(MOVIE_ID)))
        );
        assert_eq!(layout.index_keys("roleIx"), Some((MOVIE_ID, Some(ROLE_NAME))));
        assert_eq!(layout.index_keys("unknown"), None);
    }
}
