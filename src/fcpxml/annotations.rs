//! Typed annotation payloads decoded from marker-like elements

use super::element::Element;
use super::kinds::{AnnotationKind, AuxiliaryKind, ElementKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::time::{zero, Fraction};
use serde::{Deserialize, Serialize};

/// Annotation categories a caller can select for extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationType {
    Marker,
    ChapterMarker,
    ToDoMarker,
    Keyword,
    Caption,
}

impl AnnotationType {
    pub const ALL: [AnnotationType; 5] = [
        AnnotationType::Marker,
        AnnotationType::ChapterMarker,
        AnnotationType::ToDoMarker,
        AnnotationType::Keyword,
        AnnotationType::Caption,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkerKind {
    Standard,
    Chapter { poster_offset: Fraction },
    ToDo { completed: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub start: Fraction,
    pub duration: Option<Fraction>,
    pub name: String,
    pub note: Option<String>,
    pub kind: MarkerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub start: Fraction,
    pub duration: Option<Fraction>,
    /// Comma-separated `value`, split and trimmed
    pub keywords: Vec<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub name: Option<String>,
    pub offset: Option<Fraction>,
    pub start: Fraction,
    pub duration: Option<Fraction>,
    pub lane: i32,
    /// Concatenated text of the caption's `text-style` runs
    pub text: String,
    /// Raw `role` attribute (e.g. `iTT?captionFormat=ITT.en`)
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    Marker(Marker),
    Keyword(Keyword),
    Caption(Caption),
}

impl Annotation {
    /// Decode an annotation element. Ratings, analysis markers and
    /// non-annotation elements yield `None`.
    pub fn from_element(element: Element, diagnostics: &mut Diagnostics) -> Option<Annotation> {
        let kind = element.annotation_kind()?;
        match kind {
            AnnotationKind::Marker | AnnotationKind::ChapterMarker => Some(Annotation::Marker(marker(element, kind, diagnostics))),
            AnnotationKind::Keyword => Some(Annotation::Keyword(keyword(element, diagnostics))),
            AnnotationKind::Caption => Some(Annotation::Caption(caption(element, diagnostics))),
            AnnotationKind::Rating | AnnotationKind::AnalysisMarker => None,
        }
    }

    pub fn annotation_type(&self) -> AnnotationType {
        match self {
            Annotation::Marker(marker) => match marker.kind {
                MarkerKind::Standard => AnnotationType::Marker,
                MarkerKind::Chapter { .. } => AnnotationType::ChapterMarker,
                MarkerKind::ToDo { .. } => AnnotationType::ToDoMarker,
            },
            Annotation::Keyword(_) => AnnotationType::Keyword,
            Annotation::Caption(_) => AnnotationType::Caption,
        }
    }

    /// Display name: marker name, joined keywords, or caption text
    pub fn name(&self) -> String {
        match self {
            Annotation::Marker(marker) => marker.name.clone(),
            Annotation::Keyword(keyword) => keyword.keywords.join(", "),
            Annotation::Caption(caption) => caption.text.clone(),
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Annotation::Marker(marker) => marker.note.as_deref(),
            Annotation::Keyword(keyword) => keyword.note.as_deref(),
            Annotation::Caption(_) => None,
        }
    }

    pub fn duration(&self) -> Option<Fraction> {
        match self {
            Annotation::Marker(marker) => marker.duration,
            Annotation::Keyword(keyword) => keyword.duration,
            Annotation::Caption(caption) => caption.duration,
        }
    }
}

fn required_start(element: Element, diagnostics: &mut Diagnostics) -> Fraction {
    // A missing start is reported by the timing resolver
    element.start(diagnostics).unwrap_or_else(zero)
}

fn note(element: Element) -> Option<String> {
    element
        .attribute("note")
        .map(str::to_string)
        .filter(|note| !note.is_empty())
}

fn marker(element: Element, kind: AnnotationKind, diagnostics: &mut Diagnostics) -> Marker {
    let name = match element.attribute("value") {
        Some(value) => value.to_string(),
        None => {
            diagnostics.warn(
                DiagnosticKind::AttributeDecode,
                Some(element.id()),
                format!("<{}> has no value; using an empty name", element.tag()),
            );
            String::new()
        }
    };

    let marker_kind = if kind == AnnotationKind::ChapterMarker {
        MarkerKind::Chapter {
            poster_offset: element
                .time_attribute_reported("posterOffset", diagnostics)
                .unwrap_or_else(zero),
        }
    } else {
        match element.attribute("completed") {
            None => MarkerKind::Standard,
            Some("1") => MarkerKind::ToDo { completed: true },
            Some("0") => MarkerKind::ToDo { completed: false },
            Some(other) => {
                diagnostics.warn(
                    DiagnosticKind::AttributeDecode,
                    Some(element.id()),
                    format!("marker completed={:?} is not 0 or 1; treating as incomplete", other),
                );
                MarkerKind::ToDo { completed: false }
            }
        }
    };

    Marker {
        start: required_start(element, diagnostics),
        duration: element.duration(diagnostics),
        name,
        note: note(element),
        kind: marker_kind,
    }
}

fn keyword(element: Element, diagnostics: &mut Diagnostics) -> Keyword {
    let keywords = element
        .attribute("value")
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Keyword {
        start: required_start(element, diagnostics),
        duration: element.duration(diagnostics),
        keywords,
        note: note(element),
    }
}

fn caption(element: Element, diagnostics: &mut Diagnostics) -> Caption {
    let document = element.fcpxml().document();
    let text = element
        .children()
        .filter(|child| child.kind() == ElementKind::Auxiliary(AuxiliaryKind::Text))
        .map(|text| document.deep_text(text.id()).trim().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    Caption {
        name: element.attribute("name").map(str::to_string),
        offset: element.offset(diagnostics),
        start: element.start(diagnostics).unwrap_or_else(zero),
        duration: element.duration(diagnostics),
        lane: element.lane(),
        text,
        role: element.attribute("role").map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fcpxml::Fcpxml;
    use crate::time::seconds;

    const XML: &str = r#"<fcpxml version="1.11">
  <library>
    <event name="E">
      <project name="P">
        <sequence duration="60s">
          <spine>
            <gap name="G" offset="0s" duration="60s">
              <marker start="1s" duration="1/30s" value="Plain" note="check this"/>
              <marker start="2s" value="Todo" completed="0"/>
              <marker start="3s" value="Done" completed="1"/>
              <chapter-marker start="4s" value="Chapter" posterOffset="1/2s"/>
              <marker start="5s"/>
              <keyword start="0s" duration="10s" value="interview, b-roll ,"/>
              <caption lane="1" offset="6s" start="0s" duration="2s" role="SRT?captionFormat=SRT.en">
                <text><text-style ref="ts1">Hello</text-style></text>
              </caption>
              <rating start="0s" duration="1s" value="favorite"/>
            </gap>
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#;

    fn annotations(fcpxml: &Fcpxml, diagnostics: &mut Diagnostics) -> Vec<Annotation> {
        fcpxml
            .find_all(|e| e.annotation_kind().is_some())
            .into_iter()
            .filter_map(|e| Annotation::from_element(e, diagnostics))
            .collect()
    }

    #[test]
    fn test_marker_kinds() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let mut diagnostics = Diagnostics::new();
        let all = annotations(&fcpxml, &mut diagnostics);
        let types: Vec<AnnotationType> = all.iter().map(Annotation::annotation_type).collect();
        assert_eq!(
            types,
            vec![
                AnnotationType::Marker,
                AnnotationType::ToDoMarker,
                AnnotationType::ToDoMarker,
                AnnotationType::ChapterMarker,
                AnnotationType::Marker,
                AnnotationType::Keyword,
                AnnotationType::Caption,
            ]
        );

        let Annotation::Marker(plain) = &all[0] else { panic!("expected marker") };
        assert_eq!(plain.name, "Plain");
        assert_eq!(plain.note.as_deref(), Some("check this"));
        assert_eq!(plain.start, seconds(1));

        let Annotation::Marker(done) = &all[2] else { panic!("expected marker") };
        assert_eq!(done.kind, MarkerKind::ToDo { completed: true });

        let Annotation::Marker(chapter) = &all[3] else { panic!("expected marker") };
        assert_eq!(chapter.kind, MarkerKind::Chapter { poster_offset: Fraction::new(1, 2) });
    }

    #[test]
    fn test_marker_without_value_is_reported() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let mut diagnostics = Diagnostics::new();
        let all = annotations(&fcpxml, &mut diagnostics);
        assert_eq!(all[4].name(), "");
        assert_eq!(diagnostics.count(DiagnosticKind::AttributeDecode), 1);
    }

    #[test]
    fn test_keyword_and_caption() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let mut diagnostics = Diagnostics::new();
        let all = annotations(&fcpxml, &mut diagnostics);

        let Annotation::Keyword(keyword) = &all[5] else { panic!("expected keyword") };
        assert_eq!(keyword.keywords, vec!["interview", "b-roll"]);
        assert_eq!(keyword.duration, Some(seconds(10)));

        let Annotation::Caption(caption) = &all[6] else { panic!("expected caption") };
        assert_eq!(caption.text, "Hello");
        assert_eq!(caption.lane, 1);
        assert_eq!(caption.offset, Some(seconds(6)));
        assert_eq!(caption.role.as_deref(), Some("SRT?captionFormat=SRT.en"));
    }
}
