// Mapper to convert domain models to JSON payloads
use crate::application::series_service::PixelSample;
use crate::domain::geo::{GeoPoint, PixelOffset, TileAddress};
use crate::domain::precipitation::{
    Color, Intensity, PrecipitationReading, PrecipitationSeries, ReadingOutcome,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PointJson {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct TileJson {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Serialize)]
pub struct PixelJson {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ColorJson {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Serialize)]
pub struct PixelSampleJson {
    pub point: PointJson,
    pub tile: TileJson,
    pub pixel: PixelJson,
    pub color: ColorJson,
    /// 1x1 PNG of the sampled pixel as a `data:` URI
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct ReadingJson {
    pub basetime: String,
    pub validtime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_at: Option<String>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mm_per_hour: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SeriesJson {
    pub point: PointJson,
    pub tile: TileJson,
    pub pixel: PixelJson,
    pub readings: Vec<ReadingJson>,
}

pub fn pixel_sample_to_json(sample: PixelSample, image: String) -> PixelSampleJson {
    PixelSampleJson {
        point: point_to_json(sample.point),
        tile: tile_to_json(sample.tile),
        pixel: pixel_to_json(sample.pixel),
        color: color_to_json(sample.color),
        image,
    }
}

pub fn series_to_json(series: PrecipitationSeries) -> SeriesJson {
    SeriesJson {
        point: point_to_json(series.point),
        tile: tile_to_json(series.tile),
        pixel: pixel_to_json(series.pixel),
        readings: series.readings.into_iter().map(reading_to_json).collect(),
    }
}

fn reading_to_json(reading: PrecipitationReading) -> ReadingJson {
    let base_at = reading.timestep.base_at().map(|t| t.to_rfc3339());
    let valid_at = reading.timestep.valid_at().map(|t| t.to_rfc3339());

    let (status, mm_per_hour) = match (reading.is_failed(), reading.intensity()) {
        (true, _) => ("failed", None),
        (false, Intensity::Rate(rate)) => ("rate", Some(rate)),
        (false, Intensity::NoEcho) => ("no_echo", None),
        (false, Intensity::Unknown) => ("unknown", None),
    };
    let (color, error) = match reading.outcome {
        ReadingOutcome::Classified { color, .. } => (Some(color_to_json(color)), None),
        ReadingOutcome::Failed { reason } => (None, Some(reason)),
    };

    ReadingJson {
        basetime: reading.timestep.basetime,
        validtime: reading.timestep.validtime,
        base_at,
        valid_at,
        status,
        mm_per_hour,
        color,
        error,
    }
}

fn point_to_json(point: GeoPoint) -> PointJson {
    PointJson {
        latitude: point.latitude,
        longitude: point.longitude,
    }
}

fn tile_to_json(tile: TileAddress) -> TileJson {
    TileJson {
        zoom: tile.zoom.value(),
        x: tile.x,
        y: tile.y,
    }
}

fn pixel_to_json(pixel: PixelOffset) -> PixelJson {
    PixelJson {
        x: pixel.x,
        y: pixel.y,
    }
}

fn color_to_json(color: Color) -> ColorJson {
    ColorJson {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::precipitation::TimestepRef;

    fn timestep() -> TimestepRef {
        TimestepRef::new("20231018120000".to_string(), "20231018123500".to_string())
    }

    #[test]
    fn test_reading_statuses_are_distinct() {
        let rate = reading_to_json(PrecipitationReading::classified(
            timestep(),
            Color::new(242, 242, 255, 255),
        ));
        assert_eq!(rate.status, "rate");
        assert_eq!(rate.mm_per_hour, Some(0.0));

        let no_echo = reading_to_json(PrecipitationReading::classified(
            timestep(),
            Color::new(255, 255, 255, 0),
        ));
        assert_eq!(no_echo.status, "no_echo");
        assert_eq!(no_echo.mm_per_hour, None);

        let unknown =
            reading_to_json(PrecipitationReading::classified(timestep(), Color::new(1, 2, 3, 4)));
        assert_eq!(unknown.status, "unknown");
        assert_eq!(unknown.color, Some(ColorJson { r: 1, g: 2, b: 3, a: 4 }));

        let failed = reading_to_json(PrecipitationReading::failed(timestep(), "404".to_string()));
        assert_eq!(failed.status, "failed");
        assert!(failed.color.is_none());
        assert_eq!(failed.error.as_deref(), Some("404"));
    }

    #[test]
    fn test_reading_json_shape() {
        let reading =
            reading_to_json(PrecipitationReading::classified(timestep(), Color::new(255, 40, 0, 255)));
        let value = serde_json::to_value(&reading).unwrap();

        assert_eq!(value["valid_at"], "2023-10-18T12:35:00+00:00");
        assert_eq!(value["mm_per_hour"], 50.0);
        assert_eq!(value["color"]["g"], 40);
        assert!(value.get("error").is_none());
    }
}
