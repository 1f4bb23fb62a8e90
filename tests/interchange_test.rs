// Conversion of extracted FCPXML annotations into the shared DAW marker form

use daw_interchange::diagnostics::Diagnostics;
use daw_interchange::fcpxml::{ExtractionSettings, Fcpxml};
use daw_interchange::interchange::{from_json, markers_from_extracted, to_json};
use daw_interchange::time::{seconds, FrameRate};
use daw_interchange::{DawMarkerKind, MarkerTime, MarkerTimeStyle};

const XML: &str = r#"<fcpxml version="1.11">
  <resources>
    <format id="r1" frameDuration="1001/30000s"/>
  </resources>
  <library>
    <event name="E">
      <project name="P">
        <sequence format="r1" tcStart="3600s" tcFormat="NDF" duration="120s">
          <spine>
            <gap name="Gap" offset="3600s" start="3600s" duration="120s">
              <marker start="3610s" value="Ten" note="pickup"/>
              <chapter-marker start="3620s" value="Act Two" posterOffset="0s"/>
              <marker start="3630s" value="Todo" completed="1"/>
            </gap>
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#;

#[test]
fn test_marker_kinds_and_comments() {
    let fcpxml = Fcpxml::parse(XML).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    let project = fcpxml.projects()[0];
    let mut diagnostics = Diagnostics::new();
    let start = fcpxml.timeline_start(project, &mut diagnostics);

    let markers = markers_from_extracted(&result.annotations, start, MarkerTimeStyle::Rational).unwrap();
    let kinds: Vec<DawMarkerKind> = markers.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![DawMarkerKind::Comment, DawMarkerKind::Chapter, DawMarkerKind::ToDo]);
    assert_eq!(markers[0].comment.as_deref(), Some("pickup"));
    assert_eq!(markers[0].time, MarkerTime::RationalRelativeToStart(seconds(10)));
    assert_eq!(markers[0].frame_rate, FrameRate::Fps29_97);
}

#[test]
fn test_each_time_style_resolves_to_the_same_timecode() {
    let fcpxml = Fcpxml::parse(XML).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    let start = seconds(3600);
    let first = &result.annotations[0];

    for style in [MarkerTimeStyle::RealTime, MarkerTimeStyle::Timecode, MarkerTimeStyle::Rational] {
        let marker = daw_interchange::DawMarker::from_extracted(first, start, style).unwrap();
        let timecode = marker.resolve_timecode(start).unwrap();
        assert_eq!(timecode, first.timecode.unwrap(), "{:?}", style);
        let seconds_from_start = marker.real_time_seconds(start).unwrap();
        assert!((seconds_from_start - 10.0).abs() < 1.0 / 29.97, "{:?}", style);
    }
}

#[test]
fn test_json_export() {
    let fcpxml = Fcpxml::parse(XML).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    let markers = markers_from_extracted(&result.annotations, seconds(3600), MarkerTimeStyle::Timecode).unwrap();

    let json = to_json(&markers).unwrap();
    assert!(json.contains("\"AbsoluteTimecode\""));
    assert!(json.contains("Act Two"));

    let parsed = from_json(&json).unwrap();
    assert_eq!(parsed, markers);
}
