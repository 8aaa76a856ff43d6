//! Certificate text and the flowables that carry it.

use super::request::{present, CertificateRequest, CourseDescriptor};
use crate::geometry::cm;
use crate::layout::{
    escape_markup, Color, Flowable, HAlign, HorizontalRule, ImageFlowable, ListFlowable, ListItem,
    Paragraph, ParagraphStyle, Spacer, Table, TextAlign, VAlign,
};
use crate::writer::ImageRef;

/// Brand blue used by the title and the header rule.
pub const BRAND_BLUE: u32 = 0x009CDE;

/// One line of the course details list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Inline markup
    pub text: String,
    /// 0 for top-level items, 1 for the per-modality breakdown
    pub level: u8,
}

impl ListEntry {
    fn top(text: String) -> Self {
        Self { text, level: 0 }
    }

    fn nested(text: String) -> Self {
        Self { text, level: 1 }
    }
}

/// The bulleted course details, in print order.
///
/// Code, family and area lines only appear when those fields are present
/// and non-empty. Values are printed verbatim, surrounding spaces included.
pub fn course_details(course: &CourseDescriptor) -> Vec<ListEntry> {
    let mut entries = Vec::new();

    if !course.title.is_empty() {
        let mut title = format!("Título del curso: <b>{}</b>", escape_markup(&course.title));
        if let Some(code) = present(&course.code) {
            title.push_str(&format!(" (<b>{}</b>)", escape_markup(code)));
        }
        entries.push(ListEntry::top(title));
    }
    if let Some(family) = present(&course.professional_family) {
        entries.push(ListEntry::top(format!(
            "Familia Profesional: <b>{}</b>",
            escape_markup(family)
        )));
    }
    if let Some(area) = present(&course.professional_area) {
        entries.push(ListEntry::top(format!("Área Profesional: <b>{}</b>", escape_markup(area))));
    }

    let hours = course.hours;
    entries.push(ListEntry::top(format!(
        "Fechas de impartición: del <b>{}</b> al <b>{}</b>",
        escape_markup(&course.start_date),
        escape_markup(&course.end_date)
    )));
    entries.push(ListEntry::top(format!("Horas totales impartidas: <b>{}</b> horas", hours.total)));
    entries.push(ListEntry::top("Horas impartidas por modalidad:".to_string()));

    entries.push(ListEntry::nested(format!("Presencial: {} horas", hours.presential)));
    entries.push(ListEntry::nested(format!("Webinar/presencial virtual: {} horas", hours.webinar)));
    entries.push(ListEntry::nested(format!("Tutorízación online: {} horas", hours.online)));

    entries
}

/// Paragraph styles of the certificate.
#[derive(Debug, Clone)]
pub(crate) struct Styles {
    pub normal: ParagraphStyle,
    pub normal_spacer: ParagraphStyle,
    pub title: ParagraphStyle,
    pub footer: ParagraphStyle,
    pub right_align_title: ParagraphStyle,
    pub small: ParagraphStyle,
}

impl Styles {
    pub fn new() -> Self {
        let normal = ParagraphStyle::default()
            .with_size(12.0, 18.0)
            .with_alignment(TextAlign::Justify);
        Self {
            normal_spacer: normal.clone().with_left_indent(cm(0.2)),
            title: normal
                .clone()
                .with_size(21.0, 30.0)
                .with_alignment(TextAlign::Center)
                .with_color(Color::hex(BRAND_BLUE))
                .with_spacing(4.0, 8.0),
            footer: normal
                .clone()
                .with_size(9.0, 12.0)
                .with_alignment(TextAlign::Center),
            right_align_title: normal.clone().with_alignment(TextAlign::Right),
            small: normal.clone().with_size(10.0, 18.0),
            normal,
        }
    }
}

fn paragraph(markup: &str, style: &ParagraphStyle) -> Box<dyn Flowable> {
    Box::new(Paragraph::new(markup, style.clone()))
}

/// Header logo with its display size.
pub(crate) struct HeaderLogo {
    pub image: ImageRef,
    pub width: f32,
    pub height: f32,
}

/// Build the page story top to bottom.
///
/// `issued_at` is the formatted timestamp shared by both signature cells.
pub(crate) fn build_story(
    request: &CertificateRequest,
    logo: HeaderLogo,
    issued_at: &str,
) -> Vec<Box<dyn Flowable>> {
    let styles = Styles::new();
    let signer = &request.signer;
    let participant = &request.participant;
    let mut story: Vec<Box<dyn Flowable>> = Vec::new();

    let logo_cell: Box<dyn Flowable> =
        Box::new(ImageFlowable::new(logo.image, logo.width, logo.height));
    let header = Table::new(vec![vec![
        logo_cell,
        paragraph("CERTIFICADO<br/>DE IMPARTICIÓN", &styles.title),
    ]])
    .with_col_widths(vec![cm(6.0), cm(10.0)])
    .with_row_heights(vec![cm(3.8)])
    .with_alignment(HAlign::Center, VAlign::Middle);
    story.push(Box::new(header));
    story.push(Box::new(HorizontalRule::new(0.9, 1.5, Color::hex(BRAND_BLUE))));
    story.push(Box::new(Spacer::new(1.0, 25.0)));

    let intro = format!(
        "<b>{}</b>, con DNI <b>{}</b>, usuario registrado en WeKAb en calidad de <b>{}</b> de <b>{}</b> con CIF <b>{}</b>",
        escape_markup(&signer.full_name),
        escape_markup(&signer.national_id),
        escape_markup(&signer.role),
        escape_markup(&signer.organization),
        escape_markup(&signer.organization_tax_id),
    );
    story.push(Box::new(Table::fixed_height(paragraph(&intro, &styles.normal), cm(2.5))));

    story.push(paragraph("<u>Certifica que:</u>", &styles.normal_spacer));
    story.push(Box::new(Spacer::new(1.0, 16.0)));

    let course_intro = format!(
        "<b>{}</b>, con DNI {}, <b>ha impartido</b> el curso cuyos datos se indican a continuación:",
        escape_markup(&participant.full_name),
        escape_markup(&participant.national_id),
    );
    story.push(Box::new(Table::fixed_height(
        paragraph(&course_intro, &styles.normal),
        cm(1.8),
    )));

    let items = course_details(&request.course)
        .into_iter()
        .map(|entry| match entry.level {
            0 => ListItem::new(entry.text),
            _ => ListItem::nested(entry.text),
        })
        .collect();
    story.push(Box::new(Table::fixed_height(
        Box::new(ListFlowable::new(items, styles.normal.clone())),
        cm(8.1),
    )));

    story.push(paragraph(
        "Se expide el presente certificado a través de la plataforma <b>WeKAb.com</b> \
         para la acreditación de la experiencia docente.",
        &styles.normal_spacer,
    ));
    story.push(Box::new(Spacer::new(1.0, 52.0)));

    let issued_by = format!(
        "{}<br/>DNI: {}<br/>Fecha y hora: {}",
        escape_markup(&signer.full_name),
        escape_markup(&signer.national_id),
        issued_at
    );
    let verified = format!(
        "<i>3P Ventures S.L. - WeKAb.com con CIF B27464593 el día {} y firmado con un certificado emitido por FNMT</i>",
        issued_at
    );
    let signatures = Table::new(vec![
        vec![
            paragraph("<i>Emitido por:</i><br/><br/>", &styles.normal),
            paragraph("<i>Verificado por:</i><br/><br/>", &styles.right_align_title),
        ],
        vec![paragraph(&issued_by, &styles.normal), paragraph(&verified, &styles.small)],
    ])
    .with_col_widths(vec![cm(9.0), cm(7.0)])
    .with_alignment(HAlign::Left, VAlign::Top);
    story.push(Box::new(signatures));
    story.push(Box::new(Spacer::new(1.0, 52.0)));

    story.push(paragraph(
        "Certificado generado a través de la plataforma digital WeKAb.com,<br/>\
         especializada en la gestión de la experiencia docente.",
        &styles.footer,
    ));

    story
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::request::CourseHours;

    fn course() -> CourseDescriptor {
        CourseDescriptor {
            title: "Creación automatizada de certificados".to_string(),
            code: None,
            professional_family: None,
            professional_area: None,
            start_date: "04/03/2025".to_string(),
            end_date: "15/04/2025".to_string(),
            hours: CourseHours {
                total: 380,
                presential: 380,
                webinar: 0,
                online: 0,
            },
        }
    }

    #[test]
    fn test_minimal_course_details() {
        let entries = course_details(&course());
        let top: Vec<_> = entries.iter().filter(|e| e.level == 0).collect();
        let nested: Vec<_> = entries.iter().filter(|e| e.level == 1).collect();
        assert_eq!(top.len(), 4);
        assert_eq!(nested.len(), 3);
        assert!(top[0].text.starts_with("Título del curso: <b>Creación"));
        assert!(!top[0].text.contains('('));
        assert_eq!(top[2].text, "Horas totales impartidas: <b>380</b> horas");
        assert_eq!(nested[0].text, "Presencial: 380 horas");
    }

    #[test]
    fn test_optional_lines() {
        let mut c = course();
        c.code = Some("IFCD0110".to_string());
        c.professional_family = Some("Informática y comunicaciones".to_string());
        c.professional_area = Some(String::new());
        let entries = course_details(&c);
        assert!(entries[0].text.ends_with(" (<b>IFCD0110</b>)"));
        assert_eq!(entries[1].text, "Familia Profesional: <b>Informática y comunicaciones</b>");
        assert!(!entries.iter().any(|e| e.text.starts_with("Área Profesional")));
    }

    #[test]
    fn test_optional_values_printed_verbatim() {
        let mut c = course();
        c.code = Some(" IFCD0110 ".to_string());
        c.professional_family = Some("  ".to_string());
        c.professional_area = Some(" Desarrollo ".to_string());
        let entries = course_details(&c);
        assert!(entries[0].text.ends_with(" (<b> IFCD0110 </b>)"));
        assert_eq!(entries[1].text, "Familia Profesional: <b>  </b>");
        assert_eq!(entries[2].text, "Área Profesional: <b> Desarrollo </b>");
    }

    #[test]
    fn test_empty_title_dropped_blank_title_kept() {
        let mut c = course();
        c.title = String::new();
        assert!(!course_details(&c)[0].text.starts_with("Título del curso"));

        c.title = " ".to_string();
        assert_eq!(course_details(&c)[0].text, "Título del curso: <b> </b>");
    }

    #[test]
    fn test_field_values_are_escaped() {
        let mut c = course();
        c.title = "I/O <avanzado> & más".to_string();
        let entries = course_details(&c);
        assert_eq!(
            entries[0].text,
            "Título del curso: <b>I/O &lt;avanzado&gt; &amp; más</b>"
        );
    }

    #[test]
    fn test_hours_not_validated() {
        let mut c = course();
        c.hours = CourseHours {
            total: 10,
            presential: 7,
            webinar: 7,
            online: 7,
        };
        let entries = course_details(&c);
        assert!(entries.iter().any(|e| e.text == "Horas totales impartidas: <b>10</b> horas"));
        assert!(entries.iter().any(|e| e.text == "Tutorízación online: 7 horas"));
    }
}
