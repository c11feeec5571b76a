//! Typed wrappers over the catalog, one per remote operation.
//!
//! Operations with a fixed argument list take typed arguments. Query-style
//! operations take [`Params`] so any combination of the accepted fields can
//! be sent.

use std::fmt::{Display, Formatter};

use crate::catalog::{self, Endpoint};
use crate::client::PhishnetClient;
use crate::error::Result;
use crate::params::Params;
use crate::response::ApiResponse;

/// Direction of an attendance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceUpdate {
    Add,
    Remove,
}

impl AttendanceUpdate {
    pub const fn endpoint(self) -> Endpoint<'static> {
        match self {
            Self::Add => catalog::ADD_ATTENDANCE,
            Self::Remove => catalog::REMOVE_ATTENDANCE,
        }
    }
}

impl Display for AttendanceUpdate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Remove => f.write_str("remove"),
        }
    }
}

impl PhishnetClient {
    /// The most recent blog posts.
    pub async fn get_recent_blogs(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_RECENT_BLOGS, Params::new()).await
    }

    /// Blog posts filtered by `month`, `day`, `year`, `monthname`,
    /// `username` or `author`. At least one filter is required.
    pub async fn get_blogs(&mut self, params: Params) -> Result<ApiResponse> {
        self.call(&catalog::GET_BLOGS, params).await
    }

    pub async fn get_all_artists(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_ALL_ARTISTS, Params::new()).await
    }

    /// Users who attended a show, by `showid` or `showdate`.
    pub async fn get_show_attendees(&mut self, params: Params) -> Result<ApiResponse> {
        self.call(&catalog::GET_SHOW_ATTENDEES, params).await
    }

    /// Marks the authorized user as having attended (or not) a show.
    pub async fn update_show_attendance(
        &mut self,
        show_id: u64,
        update: AttendanceUpdate,
    ) -> Result<ApiResponse> {
        self.call(&update.endpoint(), Params::new().with("showid", show_id))
            .await
    }

    /// Collections by `collectionid`, `uid` or `contains` (comma separated show ids).
    pub async fn query_collections(&mut self, params: Params) -> Result<ApiResponse> {
        self.call(&catalog::QUERY_COLLECTIONS, params).await
    }

    pub async fn get_collection(&mut self, collection_id: u64) -> Result<ApiResponse> {
        self.call(
            &catalog::GET_COLLECTION,
            Params::new().with("collectionid", collection_id),
        )
        .await
    }

    pub async fn get_all_jamcharts(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_ALL_JAMCHARTS, Params::new()).await
    }

    pub async fn get_jamchart(&mut self, song_id: u64) -> Result<ApiResponse> {
        self.call(&catalog::GET_JAMCHART, Params::new().with("songid", song_id))
            .await
    }

    pub async fn get_news(&mut self, params: Params) -> Result<ApiResponse> {
        self.call(&catalog::GET_NEWS, params).await
    }

    pub async fn get_all_people(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_ALL_PEOPLE, Params::new()).await
    }

    pub async fn get_all_people_types(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_ALL_PEOPLE_TYPES, Params::new())
            .await
    }

    /// Musicians and guests who played a show.
    pub async fn get_people_by_show(&mut self, show_id: u64) -> Result<ApiResponse> {
        self.call(
            &catalog::GET_PEOPLE_BY_SHOW,
            Params::new().with("showid", show_id),
        )
        .await
    }

    /// Shows a person appeared at, optionally limited to one year.
    pub async fn get_appearances(
        &mut self,
        person_id: u64,
        year: Option<i32>,
    ) -> Result<ApiResponse> {
        let mut params = Params::new().with("personid", person_id);
        if let Some(year) = year {
            params.insert("year", year);
        }
        self.call(&catalog::GET_APPEARANCES, params).await
    }

    pub async fn get_relationships(&mut self, uid: u64) -> Result<ApiResponse> {
        self.call(&catalog::GET_RELATIONSHIPS, Params::new().with("uid", uid))
            .await
    }

    /// Reviews by `uid`, `showid` or `showdate`.
    pub async fn query_reviews(&mut self, params: Params) -> Result<ApiResponse> {
        self.call(&catalog::QUERY_REVIEWS, params).await
    }

    /// Setlist by `showid` or `showdate`.
    pub async fn get_setlist(&mut self, params: Params) -> Result<ApiResponse> {
        self.call(&catalog::GET_SETLIST, params).await
    }

    pub async fn get_latest_setlist(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_LATEST_SETLIST, Params::new()).await
    }

    pub async fn get_recent_setlists(&mut self, limit: Option<u32>) -> Result<ApiResponse> {
        let params = match limit {
            Some(limit) => Params::new().with("limit", limit),
            None => Params::new(),
        };
        self.call(&catalog::GET_RECENT_SETLISTS, params).await
    }

    pub async fn get_progressive_history(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_PROGRESSIVE_HISTORY, Params::new())
            .await
    }

    /// "This is Phish history": shows played on today's date.
    pub async fn get_tiph(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_TIPH, Params::new()).await
    }

    pub async fn query_shows(&mut self, params: Params) -> Result<ApiResponse> {
        self.call(&catalog::QUERY_SHOWS, params).await
    }

    pub async fn get_show_links(&mut self, show_id: u64) -> Result<ApiResponse> {
        self.call(&catalog::GET_SHOW_LINKS, Params::new().with("showid", show_id))
            .await
    }

    pub async fn get_upcoming_shows(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_UPCOMING_SHOWS, Params::new()).await
    }

    /// Public profile by `uid` or `username`.
    pub async fn get_user(&mut self, params: Params) -> Result<ApiResponse> {
        self.call(&catalog::GET_USER, params).await
    }

    /// Shows attended by the authorized user.
    pub async fn get_user_shows(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_USER_SHOWS, Params::new()).await
    }

    pub async fn get_uid(&mut self, username: &str) -> Result<ApiResponse> {
        self.call(&catalog::GET_UID, Params::new().with("username", username))
            .await
    }

    pub async fn get_all_venues(&mut self) -> Result<ApiResponse> {
        self.call(&catalog::GET_ALL_VENUES, Params::new()).await
    }

    pub async fn get_venue(&mut self, venue_id: u64) -> Result<ApiResponse> {
        self.call(&catalog::GET_VENUE, Params::new().with("venueid", venue_id))
            .await
    }
}
