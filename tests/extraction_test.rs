// Annotation extraction: traversal policies, context and multicam angles

use daw_interchange::fcpxml::annotations::{AnnotationType, MarkerKind};
use daw_interchange::fcpxml::kinds::StoryKind;
use daw_interchange::fcpxml::{
    Annotation, AuditionMask, ExtractionSettings, Fcpxml, McClipAngleMask, NodeId, Occlusion,
};
use daw_interchange::time::seconds;
use daw_interchange::DiagnosticKind;

const AUDITION_XML: &str = r#"<fcpxml version="1.11">
  <resources>
    <format id="r1" frameDuration="1/24s"/>
    <asset id="r2" hasVideo="1" format="r1"/>
  </resources>
  <library>
    <event name="Audition Event">
      <project name="Audition Project">
        <sequence format="r1" tcStart="0s" duration="30s">
          <spine>
            <audition offset="0s">
              <asset-clip ref="r2" name="A" offset="0s" duration="10s">
                <marker start="1s" value="A marker"/>
              </asset-clip>
              <asset-clip ref="r2" name="B" offset="0s" duration="4s">
                <marker start="6s" value="B marker"/>
              </asset-clip>
              <asset-clip ref="r2" name="C" offset="0s" duration="10s">
                <marker start="2s" value="C marker"/>
              </asset-clip>
            </audition>
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#;

#[test]
fn test_audition_active_only() {
    let fcpxml = Fcpxml::parse(AUDITION_XML).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    assert_eq!(result.names(), vec!["A marker"]);
}

#[test]
fn test_audition_all_cases() {
    let fcpxml = Fcpxml::parse(AUDITION_XML).unwrap();
    let settings = ExtractionSettings::default().with_audition_mask(AuditionMask::AllCases);
    let result = fcpxml.extract_annotations(&settings);
    assert_eq!(result.names(), vec!["A marker", "B marker", "C marker"]);

    let occlusions: Vec<Occlusion> = result.annotations.iter().map(|a| a.occlusion).collect();
    // B's marker lies past B's own 4s duration
    assert_eq!(
        occlusions,
        vec![Occlusion::NotOccluded, Occlusion::FullyOccluded, Occlusion::NotOccluded]
    );
    assert!(result
        .annotations
        .iter()
        .all(|a| a.event_name.as_deref() == Some("Audition Event")));
}

const MIXED_XML: &str = r#"<fcpxml version="1.11">
  <resources>
    <format id="r1" frameDuration="1/25s"/>
  </resources>
  <library>
    <event name="E">
      <project name="P">
        <sequence format="r1" tcStart="0s" duration="60s">
          <spine>
            <gap name="Gap" offset="0s" duration="20s">
              <marker start="1s" value="Gap marker" note="review"/>
              <chapter-marker start="2s" value="Chapter One" posterOffset="1s"/>
              <marker start="3s" value="Fix colour" completed="0"/>
              <keyword start="0s" duration="20s" value="Interview, Wide"/>
              <caption name="Line" lane="1" offset="5s" duration="2s">
                <text><text-style ref="ts1">Hello there</text-style></text>
              </caption>
              <rating start="0s" duration="5s" value="favorite"/>
            </gap>
            <title name="Disabled Title" offset="20s" duration="5s" enabled="0">
              <marker start="1s" value="Disabled marker"/>
            </title>
            <sparkle offset="25s"/>
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#;

#[test]
fn test_every_annotation_type_is_extracted() {
    let fcpxml = Fcpxml::parse(MIXED_XML).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    let types: Vec<AnnotationType> = result
        .annotations
        .iter()
        .map(|a| a.annotation.annotation_type())
        .collect();

    assert_eq!(
        types,
        vec![
            AnnotationType::Marker,
            AnnotationType::ChapterMarker,
            AnnotationType::ToDoMarker,
            AnnotationType::Keyword,
            AnnotationType::Caption,
            AnnotationType::Marker,
        ]
    );

    let caption = &result.annotations[4];
    assert_eq!(caption.name(), "Hello there");
    assert_eq!(caption.absolute_start, seconds(5));
    assert!(caption.roles.caption.is_some());

    let Annotation::Marker(chapter) = &result.annotations[1].annotation else {
        panic!("expected a chapter marker");
    };
    assert_eq!(chapter.kind, MarkerKind::Chapter { poster_offset: seconds(1) });
}

#[test]
fn test_unknown_elements_are_reported_not_fatal() {
    let fcpxml = Fcpxml::parse(MIXED_XML).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    assert_eq!(result.diagnostics.count(DiagnosticKind::StructuralParse), 1);
}

#[test]
fn test_disabled_clips_and_type_filter() {
    let fcpxml = Fcpxml::parse(MIXED_XML).unwrap();
    let settings = ExtractionSettings::default()
        .with_include_disabled(false)
        .with_annotation_types([AnnotationType::Marker, AnnotationType::ToDoMarker]);
    let result = fcpxml.extract_annotations(&settings);
    assert_eq!(result.names(), vec!["Gap marker", "Fix colour"]);
    assert_eq!(result.annotations[0].annotation.note(), Some("review"));
}

#[test]
fn test_gaps_can_be_excluded() {
    let fcpxml = Fcpxml::parse(MIXED_XML).unwrap();
    let settings = ExtractionSettings::default().excluding(StoryKind::Gap);
    let result = fcpxml.extract_annotations(&settings);
    assert_eq!(result.names(), vec!["Disabled marker"]);
}

const MULTICAM_XML: &str = r#"<fcpxml version="1.11">
  <resources>
    <format id="r1" frameDuration="1/25s"/>
    <asset id="r3" hasVideo="1" hasAudio="1" format="r1"/>
    <media id="r2" name="Multicam">
      <multicam format="r1" tcStart="0s">
        <mc-angle name="Cam 1" angleID="a1">
          <asset-clip ref="r3" name="Cam 1 Clip" offset="0s" duration="60s">
            <marker start="12s" value="Cam 1 marker"/>
          </asset-clip>
        </mc-angle>
        <mc-angle name="Cam 2" angleID="a2">
          <asset-clip ref="r3" name="Cam 2 Clip" offset="0s" duration="60s">
            <marker start="14s" value="Cam 2 marker"/>
          </asset-clip>
        </mc-angle>
      </multicam>
    </media>
  </resources>
  <library>
    <event name="E">
      <project name="P">
        <sequence format="r1" tcStart="0s" duration="30s">
          <spine>
            <mc-clip ref="r2" name="Multi" offset="5s" start="10s" duration="10s">
              <mc-source angleID="a2" srcEnable="all"/>
            </mc-clip>
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#;

#[test]
fn test_mc_clip_active_angle() {
    let fcpxml = Fcpxml::parse(MULTICAM_XML).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    assert_eq!(result.names(), vec!["Cam 2 marker"]);

    let marker = &result.annotations[0];
    // 5s offset + (14s - 10s in-point)
    assert_eq!(marker.absolute_start, seconds(9));
    assert_eq!(marker.timecode.unwrap().to_string(), "00:00:09:00");
    assert_eq!(marker.occlusion, Occlusion::NotOccluded);
}

#[test]
fn test_mc_clip_all_angles() {
    let fcpxml = Fcpxml::parse(MULTICAM_XML).unwrap();
    let settings = ExtractionSettings::default().with_mc_clip_angle_mask(McClipAngleMask::All);
    let result = fcpxml.extract_annotations(&settings);
    assert_eq!(result.names(), vec!["Cam 1 marker", "Cam 2 marker"]);
}

#[test]
fn test_extract_from_subtree() {
    let fcpxml = Fcpxml::parse(MIXED_XML).unwrap();
    let title = fcpxml.find_first(|e| e.name() == Some("Disabled Title")).unwrap();
    let mut result = fcpxml.extract_from(title.id(), &ExtractionSettings::default());
    result.sort_by_start();
    assert_eq!(result.names(), vec!["Disabled marker"]);
    assert_eq!(result.annotations[0].absolute_start, seconds(21));
}

#[test]
fn test_mc_clip_without_sources_shows_first_angle() {
    let xml = MULTICAM_XML.replace(r#"<mc-source angleID="a2" srcEnable="all"/>"#, "");
    let fcpxml = Fcpxml::parse(&xml).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    assert_eq!(result.names(), vec!["Cam 1 marker"]);
    // 5s offset + (12s - 10s in-point)
    assert_eq!(result.annotations[0].absolute_start, seconds(7));
}

#[test]
fn test_extract_from_unknown_node_is_reported() {
    let fcpxml = Fcpxml::parse(MIXED_XML).unwrap();
    let result = fcpxml.extract_from(NodeId(usize::MAX), &ExtractionSettings::default());
    assert!(result.annotations.is_empty());
    assert_eq!(result.diagnostics.count(DiagnosticKind::StructuralParse), 1);
}

const COMPOUND_XML: &str = r#"<fcpxml version="1.11">
  <resources>
    <format id="r1" frameDuration="1/25s"/>
    <media id="r2" name="Compound">
      <sequence format="r1" tcStart="0s" duration="30s">
        <spine>
          <gap name="Inner Gap" offset="0s" start="0s" duration="30s">
            <marker start="12s" value="Inside window"/>
            <marker start="25s" value="Past window"/>
            <marker start="5s" value="Before window"/>
          </gap>
          <ref-clip ref="r2" name="Nested Self" offset="30s" duration="5s"/>
        </spine>
      </sequence>
    </media>
  </resources>
  <library>
    <event name="E">
      <project name="P">
        <sequence format="r1" tcStart="0s" duration="60s">
          <spine>
            <ref-clip ref="r2" name="Compound Clip" offset="20s" start="10s" duration="10s"/>
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#;

#[test]
fn test_ref_clip_window_crops_media_content() {
    let fcpxml = Fcpxml::parse(COMPOUND_XML).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    let occlusions: Vec<(String, Occlusion)> = result
        .annotations
        .iter()
        .map(|a| (a.name(), a.occlusion))
        .collect();
    assert_eq!(
        occlusions,
        vec![
            ("Inside window".to_string(), Occlusion::NotOccluded),
            ("Past window".to_string(), Occlusion::FullyOccluded),
            ("Before window".to_string(), Occlusion::FullyOccluded),
        ]
    );

    let visible = fcpxml.extract_annotations(&ExtractionSettings::default().visible_only());
    assert_eq!(visible.names(), vec!["Inside window"]);
}

#[test]
fn test_self_referencing_media_is_walked_once() {
    let fcpxml = Fcpxml::parse(COMPOUND_XML).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    assert_eq!(result.annotations.len(), 3);
    assert_eq!(result.diagnostics.count(DiagnosticKind::StructuralParse), 1);
}

#[test]
fn test_negative_start_has_no_timecode() {
    let xml = r#"<fcpxml version="1.11">
  <resources>
    <format id="r1" frameDuration="1/25s"/>
  </resources>
  <library>
    <event name="E">
      <project name="P">
        <sequence format="r1" tcStart="0s" duration="20s">
          <spine>
            <gap name="Early" offset="0s" start="10s" duration="10s">
              <marker start="2s" value="Before zero"/>
            </gap>
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#;

    let fcpxml = Fcpxml::parse(xml).unwrap();
    let result = fcpxml.extract_annotations(&ExtractionSettings::default());
    let marker = &result.annotations[0];
    assert_eq!(marker.absolute_start, seconds(-8));
    assert!(marker.timecode.is_none());
    assert_eq!(result.diagnostics.count(DiagnosticKind::Range), 1);
}
