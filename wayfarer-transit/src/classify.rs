//! Provider step classification and route-code extraction.

use geo::Coord;
use log::debug;
use wayfarer_core::{
    ProviderRoute, ProviderStep, RouteSegment, StepTravelMode, TransitLine, TransitRoute,
    TravelMode, Waypoint,
};

/// Line-name fragments that mark a scheduled bus rather than paratransit.
pub const BUS_KEYWORDS: [&str; 5] = ["bus", "buses", "bmc", "city bus", "provincial bus"];

/// Route code used when a line carries no usable name.
pub const UNKNOWN_ROUTE_CODE: &str = "Unknown";

/// Extract a short route code from a transit line.
///
/// The first run of ASCII digits, plus one directly following letter, is
/// taken from the long name and then the short name. Failing that the short
/// name is used verbatim, and failing that [`UNKNOWN_ROUTE_CODE`].
///
/// # Examples
/// ```
/// use wayfarer_core::TransitLine;
/// use wayfarer_transit::route_code;
///
/// let line = TransitLine {
///     name: Some("Lahug - Carbon 04L".into()),
///     short_name: Some("LC".into()),
/// };
/// assert_eq!(route_code(&line), "04L");
///
/// let named = TransitLine { name: Some("Ceres Liner".into()), short_name: Some("CL".into()) };
/// assert_eq!(route_code(&named), "CL");
/// ```
#[must_use]
pub fn route_code(line: &TransitLine) -> String {
    let name = non_empty(line.name.as_deref());
    let short_name = non_empty(line.short_name.as_deref());
    name.and_then(digit_code)
        .or_else(|| short_name.and_then(digit_code))
        .or_else(|| short_name.map(str::to_owned))
        .unwrap_or_else(|| UNKNOWN_ROUTE_CODE.to_owned())
}

/// Classify a transit line as [`TravelMode::Bus`] or
/// [`TravelMode::Paratransit`] by keyword.
#[must_use]
pub fn classify_line(line: &TransitLine) -> TravelMode {
    let mentions_bus = [line.name.as_deref(), line.short_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|text| BUS_KEYWORDS.iter().any(|keyword| text.contains(keyword)));
    if mentions_bus {
        TravelMode::Bus
    } else {
        TravelMode::Paratransit
    }
}

/// Convert one provider route into resolved segments.
///
/// The first segment starts at `origin` and the last ends at
/// `destination`, so hop endpoints keep their display names. Returns `None`
/// when the route contains a step mode other than walking or transit.
#[must_use]
pub fn convert_route(
    route: &ProviderRoute,
    origin: &Waypoint,
    destination: &Waypoint,
) -> Option<TransitRoute> {
    let last = route.steps.len().saturating_sub(1);
    route
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let from = if index == 0 {
                origin.clone()
            } else {
                stop_waypoint(step.departure_stop.as_deref(), step.start_location)
            };
            let to = if index == last {
                destination.clone()
            } else {
                stop_waypoint(step.arrival_stop.as_deref(), step.end_location)
            };
            convert_step(step, from, to)
        })
        .collect::<Option<Vec<_>>>()
        .map(TransitRoute::new)
}

fn stop_waypoint(name: Option<&str>, location: Coord<f64>) -> Waypoint {
    Waypoint {
        name: name.map(str::to_owned),
        location: Some(location),
    }
}

fn convert_step(step: &ProviderStep, from: Waypoint, to: Waypoint) -> Option<RouteSegment> {
    let segment = match &step.travel_mode {
        StepTravelMode::Walking => {
            let description = step
                .instructions
                .clone()
                .unwrap_or_else(|| format!("Walk to {to}"));
            RouteSegment::resolved(
                from,
                to,
                TravelMode::Walk,
                step.duration_seconds,
                step.distance_meters,
            )
            .with_description(description)
        }
        StepTravelMode::Transit => {
            let line = step.line.clone().unwrap_or_default();
            let mode = classify_line(&line);
            let code = route_code(&line);
            let description = format!(
                "Take {} {code} from {} to {}",
                mode_label(mode),
                step.departure_stop.as_deref().map_or_else(|| from.to_string(), str::to_owned),
                step.arrival_stop.as_deref().map_or_else(|| to.to_string(), str::to_owned),
            );
            RouteSegment::resolved(from, to, mode, step.duration_seconds, step.distance_meters)
                .with_route_code(code)
                .with_description(description)
        }
        StepTravelMode::Other(mode) => {
            debug!("discarding candidate route with unsupported step mode {mode}");
            return None;
        }
    };
    Some(match &step.polyline {
        Some(points) => segment.with_polyline(points.clone()),
        None => segment,
    })
}

const fn mode_label(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walk => "walk",
        TravelMode::Paratransit => "paratransit",
        TravelMode::Bus => "bus",
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

/// First run of ASCII digits plus an optional directly following letter.
fn digit_code(text: &str) -> Option<String> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let tail = text.get(start..)?;
    let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
    let suffix = tail
        .chars()
        .nth(digits.len())
        .filter(char::is_ascii_alphabetic);
    Some(suffix.map_or_else(|| digits.clone(), |letter| format!("{digits}{letter}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wayfarer_core::test_support::{route, transit_step, walk_step};

    fn line(name: Option<&str>, short_name: Option<&str>) -> TransitLine {
        TransitLine {
            name: name.map(str::to_owned),
            short_name: short_name.map(str::to_owned),
        }
    }

    #[rstest]
    #[case(Some("04L Lahug - Carbon"), None, "04L")]
    #[case(Some("Route 12G Labangon"), Some("12G"), "12G")]
    #[case(Some("Talamban 13C-x"), None, "13C")]
    #[case(Some("MyBus 21"), None, "21")]
    #[case(Some("Ceres"), Some("Line 7"), "7")]
    #[case(Some("Ceres"), Some("CL"), "CL")]
    #[case(Some(""), Some("  "), "Unknown")]
    #[case(None, None, "Unknown")]
    fn extracts_route_codes(
        #[case] name: Option<&str>,
        #[case] short_name: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(route_code(&line(name, short_name)), expected);
    }

    #[rstest]
    #[case(Some("MyBus 21"), None, TravelMode::Bus)]
    #[case(Some("BMC Express"), None, TravelMode::Bus)]
    #[case(None, Some("Provincial Bus"), TravelMode::Bus)]
    #[case(Some("04L Lahug - Carbon"), Some("04L"), TravelMode::Paratransit)]
    #[case(None, None, TravelMode::Paratransit)]
    fn classifies_lines(
        #[case] name: Option<&str>,
        #[case] short_name: Option<&str>,
        #[case] expected: TravelMode,
    ) {
        assert_eq!(classify_line(&line(name, short_name)), expected);
    }

    #[rstest]
    fn converts_steps_and_keeps_endpoint_names() {
        let a = Coord { x: 123.90, y: 10.30 };
        let b = Coord { x: 123.91, y: 10.31 };
        let c = Coord { x: 123.92, y: 10.32 };
        let provider_route = route(vec![
            walk_step(a, b, 240, 300),
            transit_step(b, c, 900, 4_000, Some("04L Lahug - Carbon"), Some("04L")),
        ]);
        let origin = Waypoint::named("Hotel", a);
        let destination = Waypoint::named("Museum", c);

        let converted =
            convert_route(&provider_route, &origin, &destination).expect("supported modes");

        assert_eq!(converted.segments.len(), 2);
        assert_eq!(converted.segments[0].from(), &origin);
        assert_eq!(converted.segments[1].to(), &destination);
        assert_eq!(converted.segments[1].mode(), Some(TravelMode::Paratransit));
        assert_eq!(converted.segments[1].route_code(), Some("04L"));
        assert!(converted.segments[1].polyline().is_some());
        assert_eq!(converted.total_duration_seconds(), 1_140);
    }

    #[rstest]
    fn rejects_unsupported_modes() {
        let a = Coord { x: 0.0, y: 0.0 };
        let mut step = walk_step(a, a, 10, 10);
        step.travel_mode = StepTravelMode::Other("DRIVING".into());
        let endpoint = Waypoint::at(a);
        assert!(convert_route(&route(vec![step]), &endpoint, &endpoint).is_none());
    }
}
