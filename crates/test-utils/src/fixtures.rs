//! Common test fixtures for the panel viewer.

/// Bounding boxes as `(min_lon, min_lat, max_lon, max_lat)`.
pub mod bbox {
    /// Default region: Barito Selatan regency, Central Kalimantan.
    pub const BARITO_SELATAN: (f64, f64, f64, f64) = (114.0, -2.5, 115.5, -1.0);

    /// Most of Borneo.
    pub const KALIMANTAN: (f64, f64, f64, f64) = (108.0, -4.5, 119.5, 7.5);

    /// Global 0..360 extent, as GFS serves it.
    pub const GLOBAL_0_360: (f64, f64, f64, f64) = (0.0, -90.0, 359.75, 90.0);

    /// Mid-Atlantic; disjoint from every Indonesian region above.
    pub const ATLANTIC: (f64, f64, f64, f64) = (-40.0, 10.0, -30.0, 20.0);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Point of interest used by the default configuration.
pub mod marker {
    /// Buntok, capital of Barito Selatan.
    pub const BUNTOK: (f64, f64) = (114.85, -1.71);
    pub const BUNTOK_LABEL: &str = "Buntok";
}

/// Time values shared by source and panel tests.
pub mod time {
    /// Run date of the end-to-end scenario.
    pub const E2E_DATE: &str = "2025-07-13";

    /// GFS model run times
    pub const GFS_CYCLES: [&str; 4] = ["00", "06", "12", "18"];

    /// GrADS `days since 1-1-1` value for 2025-07-13T00:00Z.
    pub const GRADS_DAYS_2025_07_13: f64 = 739446.0;

    /// Time steps in a 0.25° GFS run: 0..384 h every 3 hours.
    pub const GFS_TIME_STEPS: usize = 129;

    /// Upper bound of the lead-index input.
    pub const MAX_LEAD_INDEX: usize = 240;
}

/// Small OPeNDAP responses in the shape the GrADS data server produces.
///
/// The grid is 5 latitudes × 4 longitudes × 3 time steps over
/// 114.0..114.75°E, -3.0..-2.0°N.
pub mod opendap {
    pub const DDS: &str = "Dataset {
    Float64 time[time = 3];
    Float64 lat[lat = 5];
    Float64 lon[lon = 4];
    Grid {
     ARRAY:
        Float32 tmp2m[time = 3][lat = 5][lon = 4];
     MAPS:
        Float64 time[time = 3];
        Float64 lat[lat = 5];
        Float64 lon[lon = 4];
    } tmp2m;
    Grid {
     ARRAY:
        Float32 pratesfc[time = 3][lat = 5][lon = 4];
     MAPS:
        Float64 time[time = 3];
        Float64 lat[lat = 5];
        Float64 lon[lon = 4];
    } pratesfc;
} gfs_0p25_00z;
";

    pub const AXES_ASCII: &str = "time, [3]
739446.0, 739446.125, 739446.25
lat, [5]
-3.0, -2.75, -2.5, -2.25, -2.0
lon, [4]
114.0, 114.25, 114.5, 114.75
";

    /// `tmp2m[0:0][1:3][1:2]`; one missing value (GrADS fill).
    pub const TMP2M_ASCII: &str = "tmp2m, [1][3][2]
[0][0], 300.5, 301.0
[0][1], 9.999E20, 302.25
[0][2], 303.0, 303.5

time, [1]
739446.0
lat, [3]
-2.75, -2.5, -2.25
lon, [2]
114.25, 114.5
";

    /// What the server sends back for a dataset that does not exist yet.
    pub const ERROR_BODY: &str = "Error {
    code = 0;
    message = \"GrADS Data Server: Invalid dataset gfs20990101/gfs_0p25_00z\";
};
";
}

/// HTTP query parameters for the panel endpoint.
pub mod panel {
    pub struct PanelQuery {
        pub date: &'static str,
        pub hour: &'static str,
        pub lead: usize,
        pub parameter: &'static str,
    }

    /// The end-to-end request: precipitation at t+000 of 2025-07-13 00Z.
    pub const E2E_PRECIP: PanelQuery = PanelQuery {
        date: "2025-07-13",
        hour: "00",
        lead: 0,
        parameter: "precip",
    };

    impl PanelQuery {
        pub fn to_query_string(&self) -> String {
            format!(
                "date={}&hour={}&lead={}&parameter={}",
                self.date, self.hour, self.lead, self.parameter
            )
        }

        pub fn with_lead(&self, lead: usize) -> String {
            PanelQuery { lead, ..*self }.to_query_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region_contains_marker() {
        let (min_x, min_y, max_x, max_y) = bbox::BARITO_SELATAN;
        let (x, y) = marker::BUNTOK;
        assert!(x >= min_x && x <= max_x);
        assert!(y >= min_y && y <= max_y);
    }

    #[test]
    fn test_panel_query_string() {
        let query = panel::E2E_PRECIP.to_query_string();
        assert_eq!(query, "date=2025-07-13&hour=00&lead=0&parameter=precip");
        assert!(panel::E2E_PRECIP.with_lead(241).contains("lead=241"));
    }
}
