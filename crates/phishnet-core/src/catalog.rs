//! Static table of the phish.net v3 operations this client exposes.
//!
//! Each operation names the path it posts to, whether it needs a per-user
//! auth key, and the parameters it accepts. Several operations may share a
//! path (`get_recent_blogs` and `get_blogs` both post to `blog/get`).
//!
//! | Operation | Path | Auth |
//! |-----------|------|------|
//! | [`ADD_ATTENDANCE`] | `attendance/add` | user |
//! | [`REMOVE_ATTENDANCE`] | `attendance/remove` | user |
//! | [`GET_USER_SHOWS`] | `user/myshows` | user |
//! | everything else | | api key only |

use std::fmt::{Display, Formatter};

/// First year with data in the blog subsystem.
pub const BLOG_YEAR_FLOOR: i32 = 2009;
/// First year with show data.
pub const DEFAULT_YEAR_FLOOR: i32 = 1983;

/// Metadata for one remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub requires_auth: bool,
    pub params: &'a [&'a str],
    /// Query-style operations refuse to run with no parameters at all.
    pub requires_any: bool,
}

impl<'a> Endpoint<'a> {
    const fn open(name: &'a str, path: &'a str) -> Self {
        Self {
            name,
            path,
            requires_auth: false,
            params: &[],
            requires_any: false,
        }
    }

    const fn accepting(mut self, params: &'a [&'a str]) -> Self {
        self.params = params;
        self
    }

    const fn query(mut self, params: &'a [&'a str]) -> Self {
        self.params = params;
        self.requires_any = true;
        self
    }

    const fn privileged(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Ad-hoc endpoint for paths outside the table.
    pub const fn custom(path: &'a str) -> Self {
        Self::open(path, path)
    }

    pub fn is_blog(&self) -> bool {
        self.path.starts_with("blog/")
    }

    pub fn year_floor(&self) -> i32 {
        if self.is_blog() {
            BLOG_YEAR_FLOOR
        } else {
            DEFAULT_YEAR_FLOOR
        }
    }

    pub fn accepts(&self, param: &str) -> bool {
        self.params.iter().any(|accepted| *accepted == param)
    }
}

impl Display for Endpoint<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path)
    }
}

pub const GET_ALL_ARTISTS: Endpoint<'static> = Endpoint::open("get_all_artists", "artists/all");

pub const GET_SHOW_ATTENDEES: Endpoint<'static> =
    Endpoint::open("get_show_attendees", "attendance/get").query(&["showid", "showdate"]);
pub const ADD_ATTENDANCE: Endpoint<'static> = Endpoint::open("add_attendance", "attendance/add")
    .accepting(&["showid"])
    .privileged();
pub const REMOVE_ATTENDANCE: Endpoint<'static> =
    Endpoint::open("remove_attendance", "attendance/remove")
        .accepting(&["showid"])
        .privileged();

pub const GET_AUTHORITY: Endpoint<'static> =
    Endpoint::open("get_authority", "authority/get").accepting(&["uid", "unique_hash"]);

pub const GET_RECENT_BLOGS: Endpoint<'static> = Endpoint::open("get_recent_blogs", "blog/get");
pub const GET_BLOGS: Endpoint<'static> = Endpoint::open("get_blogs", "blog/get").query(&[
    "month",
    "day",
    "year",
    "monthname",
    "username",
    "author",
]);

pub const QUERY_COLLECTIONS: Endpoint<'static> =
    Endpoint::open("query_collections", "collections/query").query(&[
        "collectionid",
        "uid",
        "contains",
    ]);
pub const GET_COLLECTION: Endpoint<'static> =
    Endpoint::open("get_collection", "collections/get").accepting(&["collectionid"]);

pub const GET_ALL_JAMCHARTS: Endpoint<'static> =
    Endpoint::open("get_all_jamcharts", "jamcharts/all");
pub const GET_JAMCHART: Endpoint<'static> =
    Endpoint::open("get_jamchart", "jamcharts/get").accepting(&["songid"]);

pub const GET_NEWS: Endpoint<'static> = Endpoint::open("get_news", "news/get").accepting(&[
    "posted_on",
    "posted_after",
    "posted_before",
]);

pub const GET_ALL_PEOPLE: Endpoint<'static> = Endpoint::open("get_all_people", "people/all");
pub const GET_ALL_PEOPLE_TYPES: Endpoint<'static> =
    Endpoint::open("get_all_people_types", "people/get");
pub const GET_PEOPLE_BY_SHOW: Endpoint<'static> =
    Endpoint::open("get_people_by_show", "people/byshow").accepting(&["showid"]);
pub const GET_APPEARANCES: Endpoint<'static> =
    Endpoint::open("get_appearances", "people/appearances").accepting(&["personid", "year"]);

pub const GET_RELATIONSHIPS: Endpoint<'static> =
    Endpoint::open("get_relationships", "relationships/get").accepting(&["uid"]);

pub const QUERY_REVIEWS: Endpoint<'static> =
    Endpoint::open("query_reviews", "reviews/query").query(&["uid", "showid", "showdate"]);

pub const GET_SETLIST: Endpoint<'static> =
    Endpoint::open("get_setlist", "setlists/get").query(&["showid", "showdate"]);
pub const GET_LATEST_SETLIST: Endpoint<'static> =
    Endpoint::open("get_latest_setlist", "setlists/latest");
pub const GET_RECENT_SETLISTS: Endpoint<'static> =
    Endpoint::open("get_recent_setlists", "setlists/recent").accepting(&["limit"]);
pub const GET_PROGRESSIVE_HISTORY: Endpoint<'static> =
    Endpoint::open("get_progressive_history", "setlists/progressivehistory");
pub const GET_TIPH: Endpoint<'static> = Endpoint::open("get_tiph", "setlists/tiph");

pub const QUERY_SHOWS: Endpoint<'static> = Endpoint::open("query_shows", "shows/query").query(&[
    "showdate",
    "showdate_gt",
    "showdate_gte",
    "showdate_lt",
    "showdate_lte",
    "year",
    "month",
    "day",
    "monthname",
    "tourid",
    "venueid",
    "showids",
    "country",
    "state",
    "city",
    "order",
]);
pub const GET_SHOW_LINKS: Endpoint<'static> =
    Endpoint::open("get_show_links", "shows/links").accepting(&["showid"]);
pub const GET_UPCOMING_SHOWS: Endpoint<'static> =
    Endpoint::open("get_upcoming_shows", "shows/upcoming");

pub const GET_USER: Endpoint<'static> =
    Endpoint::open("get_user", "user/get").query(&["uid", "username"]);
pub const GET_USER_SHOWS: Endpoint<'static> =
    Endpoint::open("get_user_shows", "user/myshows").privileged();
pub const GET_UID: Endpoint<'static> =
    Endpoint::open("get_uid", "user/uid").accepting(&["username"]);

pub const GET_ALL_VENUES: Endpoint<'static> = Endpoint::open("get_all_venues", "venues/all");
pub const GET_VENUE: Endpoint<'static> =
    Endpoint::open("get_venue", "venues/get").accepting(&["venueid"]);

/// Every operation in the table.
pub const CATALOG: &[Endpoint<'static>] = &[
    GET_ALL_ARTISTS,
    GET_SHOW_ATTENDEES,
    ADD_ATTENDANCE,
    REMOVE_ATTENDANCE,
    GET_AUTHORITY,
    GET_RECENT_BLOGS,
    GET_BLOGS,
    QUERY_COLLECTIONS,
    GET_COLLECTION,
    GET_ALL_JAMCHARTS,
    GET_JAMCHART,
    GET_NEWS,
    GET_ALL_PEOPLE,
    GET_ALL_PEOPLE_TYPES,
    GET_PEOPLE_BY_SHOW,
    GET_APPEARANCES,
    GET_RELATIONSHIPS,
    QUERY_REVIEWS,
    GET_SETLIST,
    GET_LATEST_SETLIST,
    GET_RECENT_SETLISTS,
    GET_PROGRESSIVE_HISTORY,
    GET_TIPH,
    QUERY_SHOWS,
    GET_SHOW_LINKS,
    GET_UPCOMING_SHOWS,
    GET_USER,
    GET_USER_SHOWS,
    GET_UID,
    GET_ALL_VENUES,
    GET_VENUE,
];

/// Finds an operation by its name.
pub fn lookup(name: &str) -> Option<&'static Endpoint<'static>> {
    CATALOG.iter().find(|endpoint| endpoint.name == name)
}

/// First operation posting to `path`.
pub fn lookup_path(path: &str) -> Option<&'static Endpoint<'static>> {
    let path = path.trim_matches('/');
    CATALOG.iter().find(|endpoint| endpoint.path == path)
}
