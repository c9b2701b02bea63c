use chrono::TimeZone;
use chrono_tz::Tz;
use std::env;
use std::fmt::{self, Display, Formatter};
use tracing::warn;

use crate::ClassicLevel;

/// Same pattern as `java.util.Date#toString`. `%Z` prints the zone abbreviation
/// for named zones.
const DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

/// One line description of a level, in the form
/// `size = WxHxD, created=DATE, name=NAME, creator=CREATOR`.
pub struct Summary<'l, Z: TimeZone> {
	level: &'l ClassicLevel,
	zone: Z
}

impl ClassicLevel {
	/// Summary with the creation time in the local time zone.
	pub fn summary(&self) -> Summary<'_, Tz> {
		self.summary_in(local_zone())
	}

	pub fn summary_in<Z: TimeZone>(&self, zone: Z) -> Summary<'_, Z> {
		Summary { level: self, zone }
	}
}

/// The local time zone: `TZ` if it names a known zone, then the system setting, then UTC.
pub fn local_zone() -> Tz {
	resolve_zone(env::var("TZ").ok().as_deref())
}

fn resolve_zone(tz: Option<&str>) -> Tz {
	if let Some(name) = tz {
		match name.trim_start_matches(':').parse() {
			Ok(zone) => return zone,
			Err(_) => warn!("TZ={} is not a known time zone, using the system zone", name)
		}
	}

	match iana_time_zone::get_timezone() {
		Ok(name) => name.parse().unwrap_or_else(|_| {
			warn!("system time zone {} is not known, using UTC", name);

			Tz::UTC
		}),
		Err(error) => {
			warn!("could not determine the system time zone ({}), using UTC", error);

			Tz::UTC
		}
	}
}

impl<'l, Z: TimeZone> Display for Summary<'l, Z> where Z::Offset: Display {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		let level = self.level;

		write!(f, "size = {}x{}x{}, created=", level.width(), level.height(), level.depth())?;

		match self.zone.timestamp_millis_opt(level.time_created()).single() {
			Some(time) => write!(f, "{}", time.format(DATE_FORMAT))?,
			// Outside of what chrono can represent
			None => write!(f, "{}", level.time_created())?
		}

		write!(
			f,
			", name={}, creator={}",
			level.name().unwrap_or("null"),
			level.creator().unwrap_or("null")
		)
	}
}

#[cfg(test)]
mod test {
	use chrono::{FixedOffset, Utc};
	use chrono_tz::Tz;
	use super::resolve_zone;
	use crate::{BlockVolume, ClassicLevel};

	fn level(time_created: i64, name: Option<&str>, creator: Option<&str>) -> ClassicLevel {
		let blocks = BlockVolume::new(256, 64, 128, vec![0; 256 * 64 * 128].into_boxed_slice()).unwrap();

		ClassicLevel::new(name.map(str::to_owned), creator.map(str::to_owned), time_created, (0, 0, 0), blocks)
	}

	#[test]
	fn test_summary_line() {
		let level = level(1_245_168_000_000, Some("A Nice World"), Some("notch"));

		assert_eq!(
			level.summary_in(Utc).to_string(),
			"size = 256x64x128, created=Tue Jun 16 16:00:00 UTC 2009, name=A Nice World, creator=notch"
		);
	}

	#[test]
	fn test_summary_epoch_and_nulls() {
		let level = level(0, None, None);

		assert_eq!(
			level.summary_in(Utc).to_string(),
			"size = 256x64x128, created=Thu Jan 01 00:00:00 UTC 1970, name=null, creator=null"
		);
	}

	#[test]
	fn test_summary_offset() {
		let level = level(0, Some("--"), Some("--"));
		let zone = FixedOffset::east_opt(2 * 3600).unwrap();

		assert_eq!(
			level.summary_in(zone).to_string(),
			"size = 256x64x128, created=Thu Jan 01 02:00:00 +02:00 1970, name=--, creator=--"
		);
	}

	#[test]
	fn test_summary_out_of_range() {
		let level = level(i64::max_value(), Some("x"), Some("y"));

		assert_eq!(
			level.summary_in(Utc).to_string(),
			format!("size = 256x64x128, created={}, name=x, creator=y", i64::max_value())
		);
	}

	#[test]
	fn test_summary_named_zone() {
		let zone = resolve_zone(Some("Europe/Berlin"));

		assert_eq!(zone, Tz::Europe__Berlin);

		assert_eq!(
			level(1_245_168_000_000, Some("x"), Some("y")).summary_in(zone).to_string(),
			"size = 256x64x128, created=Tue Jun 16 18:00:00 CEST 2009, name=x, creator=y"
		);

		assert_eq!(
			level(0, Some("x"), Some("y")).summary_in(zone).to_string(),
			"size = 256x64x128, created=Thu Jan 01 01:00:00 CET 1970, name=x, creator=y"
		);
	}

	#[test]
	fn test_summary_tz_utc() {
		let zone = resolve_zone(Some("UTC"));

		assert_eq!(
			level(0, None, None).summary_in(zone).to_string(),
			"size = 256x64x128, created=Thu Jan 01 00:00:00 UTC 1970, name=null, creator=null"
		);
	}

	#[test]
	fn test_resolve_zone() {
		assert_eq!(resolve_zone(Some(":America/Los_Angeles")), Tz::America__Los_Angeles);

		// An unknown TZ falls back to the system zone, which is always some zone
		resolve_zone(Some("Not/A_Zone"));
	}
}
