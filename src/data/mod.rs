mod light_curve;
pub use light_curve::LightCurve;

mod time_format;
pub use time_format::{
    BKJD_OFFSET, BTJD_OFFSET, TimeFormat, bjd_to_bkjd, bjd_to_btjd, bkjd_to_bjd, btjd_to_bjd,
};
