use chrono::NaiveDate;

/// NASA GIBS WMTS endpoint (geographic projection)
pub const GIBS_WMTS_URL: &str = "https://gibs.earthdata.nasa.gov/wmts/epsg4326/best/wmts.cgi";

/// A tiled imagery overlay served over WMTS
#[derive(Debug, Clone, PartialEq)]
pub struct ImageryLayer {
    pub url: String,
    pub layer: String,
    pub style: String,
    pub format: String,
    pub tile_matrix_set_id: String,
    pub maximum_level: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl ImageryLayer {
    /// MODIS Terra true-color cloud imagery for one day
    pub fn daily_clouds(date: NaiveDate) -> Self {
        Self {
            url: format!("{}?time={}", GIBS_WMTS_URL, date.format("%Y-%m-%d")),
            layer: "MODIS_Terra_CorrectedReflectance_TrueColor".to_string(),
            style: String::new(),
            format: "image/jpeg".to_string(),
            tile_matrix_set_id: "EPSG4326_250m".to_string(),
            maximum_level: 8,
            tile_width: 256,
            tile_height: 256,
        }
    }
}
