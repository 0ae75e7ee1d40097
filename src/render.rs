use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Image, ImageTransform, Line, Mm, PdfDocument, Point,
};

use crate::error::RenderError;
use crate::invoice::{usd, Invoice, LineItem};

/* Letter paper, 0.75in margins, all coordinates in millimetres from the
 * bottom-left corner. The table is four columns: a wide services column
 * and three numeric ones. */
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 19.05;

const BODY_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 14.0;
const DETAIL_SIZE: f32 = 9.0;

const LINE: f32 = 5.0;
const GAP: f32 = 6.35;
const SMALL_GAP: f32 = 3.81;

const LOGO_WIDTH: f32 = 50.8;
const LOGO_HEIGHT: f32 = 15.24;

const COLUMNS: [f32; 4] = [19.05, 114.3, 133.35, 152.4];
const TABLE_RIGHT: f32 = 171.45;
const ROW_HEIGHT: f32 = 7.0;
const DETAIL_ROW_HEIGHT: f32 = 11.5;
const CELL_PAD: f32 = 2.0;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Face {
    Regular,
    Bold,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Span {
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub face: Face,
    pub text: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Rule {
    pub page: usize,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, PartialEq, Clone)]
pub struct LogoSlot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Everything the document will show, resolved to pages and positions
/// but not yet drawn.
#[derive(Debug, PartialEq, Clone)]
pub struct Layout {
    pub pages: usize,
    pub spans: Vec<Span>,
    pub rules: Vec<Rule>,
    pub logo: Option<LogoSlot>,
}

struct Sheet {
    layout: Layout,
    page: usize,
    y: f32,
}

impl Sheet {
    fn new() -> Self {
        Self {
            layout: Layout {
                pages: 1,
                spans: Vec::new(),
                rules: Vec::new(),
                logo: None,
            },
            page: 0,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    // Reserve vertical room, moving to a fresh page when it will not fit.
    fn feed(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.layout.pages += 1;
            self.page += 1;
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn line(&mut self, height: f32) -> f32 {
        self.feed(height);
        self.y -= height;
        self.y
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn span(&mut self, x: f32, y: f32, size: f32, face: Face, text: &str) {
        if text.is_empty() {
            return;
        }
        self.layout.spans.push(Span {
            page: self.page,
            x,
            y,
            size,
            face,
            text: text.to_string(),
        });
    }

    fn rule(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.layout.rules.push(Rule {
            page: self.page,
            x1,
            y1,
            x2,
            y2,
        });
    }
}

pub fn layout(invoice: &Invoice, with_logo: bool) -> Layout {
    let mut sheet = Sheet::new();

    if with_logo {
        sheet.layout.logo = Some(LogoSlot {
            x: MARGIN,
            y: sheet.y - LOGO_HEIGHT,
            width: LOGO_WIDTH,
            height: LOGO_HEIGHT,
        });
        sheet.gap(LOGO_HEIGHT + GAP);
    }

    if let Some(number) = &invoice.number {
        let baseline = sheet.line(LINE);
        sheet.span(MARGIN, baseline, BODY_SIZE, Face::Bold, "Invoice #:");
        sheet.span(MARGIN + 22.0, baseline, BODY_SIZE, Face::Regular, number);
    }

    let baseline = sheet.line(8.0);
    sheet.span(MARGIN, baseline, TITLE_SIZE, Face::Bold, &invoice.title);
    sheet.gap(2.0);

    let date = invoice.date.format("%B %d, %Y").to_string();
    let baseline = sheet.line(LINE);
    sheet.span(MARGIN, baseline, BODY_SIZE, Face::Bold, "Date:");
    sheet.span(MARGIN + 13.0, baseline, BODY_SIZE, Face::Regular, &date);
    sheet.gap(GAP);

    let baseline = sheet.line(LINE);
    sheet.span(MARGIN, baseline, BODY_SIZE, Face::Bold, "From:");
    let baseline = sheet.line(LINE);
    sheet.span(MARGIN, baseline, BODY_SIZE, Face::Regular, &invoice.from.name);
    let baseline = sheet.line(LINE);
    sheet.span(MARGIN, baseline, BODY_SIZE, Face::Regular, &invoice.from.email);
    sheet.gap(SMALL_GAP);

    let baseline = sheet.line(LINE);
    sheet.span(MARGIN, baseline, BODY_SIZE, Face::Bold, "To:");
    let baseline = sheet.line(LINE);
    sheet.span(MARGIN, baseline, BODY_SIZE, Face::Regular, &invoice.to.name);
    if let Some(company) = &invoice.to.company {
        let baseline = sheet.line(LINE);
        sheet.span(MARGIN, baseline, BODY_SIZE, Face::Regular, company);
    }
    sheet.gap(GAP);

    table_row(&mut sheet, Face::Bold, ["Services", "Quantity", "Rate", "Amount"]);
    for item in invoice.items.iter() {
        item_row(&mut sheet, item);
    }
    let total = usd(invoice.total());
    table_row(&mut sheet, Face::Bold, ["Total", "", "", &total]);
    sheet.gap(GAP);

    let baseline = sheet.line(LINE);
    sheet.span(MARGIN, baseline, BODY_SIZE, Face::Bold, "Payment Method:");
    sheet.span(
        MARGIN + 33.0,
        baseline,
        BODY_SIZE,
        Face::Regular,
        &invoice.from.payment_method,
    );

    if let Some(notes) = &invoice.notes {
        sheet.gap(SMALL_GAP);
        let baseline = sheet.line(LINE);
        sheet.span(MARGIN, baseline, BODY_SIZE, Face::Bold, "Notes:");
        sheet.span(MARGIN + 15.0, baseline, BODY_SIZE, Face::Regular, notes);
    }

    sheet.layout
}

// Every row carries its own border box, so a page break between rows
// still leaves a closed grid on both pages.
fn row_borders(sheet: &mut Sheet, top: f32, height: f32) {
    let bottom = top - height;
    sheet.rule(MARGIN, top, TABLE_RIGHT, top);
    sheet.rule(MARGIN, bottom, TABLE_RIGHT, bottom);
    for x in COLUMNS {
        sheet.rule(x, top, x, bottom);
    }
    sheet.rule(TABLE_RIGHT, top, TABLE_RIGHT, bottom);
}

fn table_row(sheet: &mut Sheet, face: Face, cells: [&str; 4]) {
    sheet.feed(ROW_HEIGHT);
    let top = sheet.y;
    sheet.y -= ROW_HEIGHT;

    for (x, text) in COLUMNS.iter().zip(cells) {
        sheet.span(x + CELL_PAD, top - 5.0, BODY_SIZE, face, text);
    }
    row_borders(sheet, top, ROW_HEIGHT);
}

fn item_row(sheet: &mut Sheet, item: &LineItem) {
    let height = match item.detail {
        Some(_) => DETAIL_ROW_HEIGHT,
        None => ROW_HEIGHT,
    };
    sheet.feed(height);
    let top = sheet.y;
    sheet.y -= height;

    let quantity = item.quantity.normalize().to_string();
    let rate = usd(item.rate);
    let amount = usd(item.amount());
    let cells: [&str; 4] = [&item.description, &quantity, &rate, &amount];
    for (x, text) in COLUMNS.iter().zip(cells) {
        sheet.span(x + CELL_PAD, top - 5.0, BODY_SIZE, Face::Regular, text);
    }
    if let Some(detail) = &item.detail {
        sheet.span(
            MARGIN + CELL_PAD + 3.0,
            top - 9.5,
            DETAIL_SIZE,
            Face::Regular,
            detail,
        );
    }
    row_borders(sheet, top, height);
}

pub fn load_logo(path: &Path) -> Option<Image> {
    let mut file = File::open(path).ok()?;
    let decoder = PngDecoder::new(&mut file).ok()?;
    Image::try_from(decoder).ok()
}

fn draw(
    invoice: &Invoice,
    plan: &Layout,
    logo: Option<Image>,
) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        invoice.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
    for _ in 1..plan.pages {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        layers.push(doc.get_page(page).get_layer(layer));
    }

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    for span in plan.spans.iter() {
        let font = match span.face {
            Face::Regular => &regular,
            Face::Bold => &bold,
        };
        layers[span.page].use_text(
            span.text.as_str(),
            span.size,
            Mm(span.x),
            Mm(span.y),
            font,
        );
    }

    for layer in layers.iter() {
        layer.set_outline_thickness(0.5);
    }
    for rule in plan.rules.iter() {
        layers[rule.page].add_line(Line {
            points: vec![
                (Point::new(Mm(rule.x1), Mm(rule.y1)), false),
                (Point::new(Mm(rule.x2), Mm(rule.y2)), false),
            ],
            is_closed: false,
        });
    }

    if let (Some(slot), Some(image)) = (&plan.logo, logo) {
        let width_px = image.image.width.0 as f32;
        let height_px = image.image.height.0 as f32;
        let dpi = 300.0;
        image.add_to_layer(
            layers[0].clone(),
            ImageTransform {
                translate_x: Some(Mm(slot.x)),
                translate_y: Some(Mm(slot.y)),
                dpi: Some(dpi),
                scale_x: Some(slot.width / 25.4 * dpi / width_px),
                scale_y: Some(slot.height / 25.4 * dpi / height_px),
                ..Default::default()
            },
        );
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)?;
    Ok(writer.into_inner().map_err(io::Error::from)?)
}

pub fn render(
    invoice: &Invoice,
    logo: Option<Image>,
) -> Result<Vec<u8>, RenderError> {
    let plan = layout(invoice, logo.is_some());
    draw(invoice, &plan, logo)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::invoice::{Recipient, Sender};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn item(description: &str, quantity: Decimal, rate: Decimal) -> LineItem {
        LineItem {
            description: description.to_string(),
            detail: None,
            quantity,
            rate,
        }
    }

    fn sample(items: Vec<LineItem>) -> Invoice {
        Invoice {
            number: Some("INV-001".to_string()),
            title: "March Services".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            from: Sender {
                name: "Adam Luck".to_string(),
                email: "adamluckydo@gmail.com".to_string(),
                payment_method: "PayPal - adamluckydo@gmail.com".to_string(),
            },
            to: Recipient {
                name: "Acme Corp".to_string(),
                company: None,
            },
            items,
            notes: None,
        }
    }

    fn find<'a>(plan: &'a Layout, text: &str) -> &'a Span {
        plan.spans
            .iter()
            .find(|s| s.text == text)
            .unwrap_or_else(|| panic!("no span: {}", text))
    }

    fn has(plan: &Layout, text: &str) -> bool {
        plan.spans.iter().any(|s| s.text == text)
    }

    #[test]
    fn layouts_are_deterministic() {
        let invoice = sample(vec![item("Consulting", dec!(2), dec!(150))]);
        assert_eq!(layout(&invoice, false), layout(&invoice, false));
    }

    #[test]
    fn amounts_come_from_quantity_times_rate() {
        let plan = layout(
            &sample(vec![item("Consulting", dec!(2), dec!(150))]),
            false,
        );
        assert!(has(&plan, "$300.00"));
        assert!(has(&plan, "$150.00"));
    }

    #[test]
    fn an_unnumbered_invoice_has_no_number_line() {
        let mut invoice = sample(vec![]);
        invoice.number = None;
        let plan = layout(&invoice, false);
        assert!(!has(&plan, "Invoice #:"));
        assert!(has(&plan, "March Services"));
    }

    #[test]
    fn zero_items_still_total() {
        let plan = layout(&sample(vec![]), false);
        assert!(has(&plan, "Services"));
        assert!(has(&plan, "Total"));
        assert!(has(&plan, "$0.00"));
        assert_eq!(plan.pages, 1);
    }

    #[test]
    fn items_keep_their_input_order() {
        let plan = layout(
            &sample(vec![
                item("First", dec!(1), dec!(10)),
                item("Second", dec!(1), dec!(20)),
            ]),
            false,
        );
        let first = find(&plan, "First");
        let second = find(&plan, "Second");
        assert_eq!(first.page, second.page);
        assert!(first.y > second.y);
    }

    #[test]
    fn dates_render_long_form() {
        let plan = layout(&sample(vec![]), false);
        assert!(has(&plan, "March 31, 2026"));
    }

    #[test]
    fn details_sit_under_their_item() {
        let mut detailed = item("Consulting", dec!(1), dec!(100));
        detailed.detail = Some("March retainer".to_string());
        let plan = layout(&sample(vec![detailed]), false);

        let main = find(&plan, "Consulting");
        let detail = find(&plan, "March retainer");
        assert!(detail.y < main.y);
        assert!(detail.x > main.x);
        assert!(detail.size < main.size);
    }

    #[test]
    fn a_logo_slot_pushes_everything_down() {
        let invoice = sample(vec![]);
        let without = layout(&invoice, false);
        let with = layout(&invoice, true);

        assert!(without.logo.is_none());
        let slot = with.logo.as_ref().unwrap();
        assert_eq!(slot.width, LOGO_WIDTH);
        assert!(
            find(&with, "March Services").y
                < find(&without, "March Services").y
        );
    }

    #[test]
    fn long_invoices_flow_onto_more_pages() {
        let items = (0..60)
            .map(|n| item(&format!("Task {}", n), dec!(1), dec!(25)))
            .collect();
        let plan = layout(&sample(items), false);

        assert!(plan.pages >= 2);
        assert!(has(&plan, "Task 59"));
        for span in plan.spans.iter() {
            assert!(span.page < plan.pages);
            assert!(span.y >= MARGIN && span.y <= PAGE_HEIGHT - MARGIN);
        }
        for rule in plan.rules.iter() {
            assert!(rule.page < plan.pages);
            assert!(rule.y1 >= MARGIN && rule.y2 >= MARGIN);
        }
        // The total lands after the last item, never on an earlier page.
        let last_page = plan.pages - 1;
        assert_eq!(find(&plan, "Total").page, last_page);
    }

    #[test]
    fn rendered_bytes_are_a_pdf() -> Result<(), RenderError> {
        let bytes = render(
            &sample(vec![item("Consulting", dec!(2), dec!(150))]),
            None,
        )?;
        assert!(bytes.starts_with(b"%PDF"));
        Ok(())
    }
}
