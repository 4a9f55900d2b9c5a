use std::collections::HashMap;

/// Marker stored when the form carried no net/screen selection.
pub const NET_NONE: &str = "no-net";

const NEW_ORDER_MARKER: &str = "🆕";
const AREA_UNIT: &str = "м²";

const L_WINDOWS: &str = "🪟 Derazalar";
const L_DOORS: &str = "🚪 Eshiklar";
const L_PROFILE: &str = "🧱 Profil";
const L_COLOR: &str = "🎨 Rang";
const L_GLASS: &str = "🪞 Oyna paketi";
const L_NET: &str = "🕸 Setka";
// Some clients append U+FE0F (variation selector) to the spider-web emoji.
const L_NET_ALT: &str = "🕸\u{fe0f} Setka";
const L_SILL: &str = "🪵 Podokonnik";
const L_TOTAL: &str = "💰 Umumiy summa";
const L_DEPOSIT: &str = "💵 Oldindan to'lov";
const L_REST: &str = "💳 Qolgan summa";
const L_DATE: &str = "📅 O'rnatish sanasi";

/// A parsed but not yet persisted order. Text fields fall back to an empty
/// string, numeric fields to `None`; parsing never fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub windows: String,
    pub window_square: Option<f64>,
    pub doors: String,
    pub door_square: Option<f64>,
    pub profile: String,
    pub color: String,
    pub glass: String,
    pub net: String,
    pub sill: String,
    pub total: Option<f64>,
    pub deposit: Option<f64>,
    pub rest: Option<f64>,
    pub install_date: String,
    pub raw_text: String,
}

/// Parse the text block the order form sends through the web-app bridge.
///
/// The first three `label: value` lines are positional (name, phone, address)
/// no matter what their labels say; everything after that is looked up by the
/// exact emoji-prefixed label the form emits. Unknown labels are ignored.
pub fn parse_order(raw: &str) -> OrderDraft {
    let mut lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines
        .first()
        .is_some_and(|l| l.starts_with(NEW_ORDER_MARKER))
    {
        lines.remove(0);
    }

    let labeled: Vec<(&str, &str)> = lines
        .iter()
        .filter_map(|l| l.split_once(':'))
        .map(|(label, value)| (label.trim(), value.trim()))
        .collect();

    let positional = |i: usize| {
        labeled
            .get(i)
            .map(|(_, v)| (*v).to_string())
            .unwrap_or_default()
    };
    let fields: HashMap<&str, &str> = labeled.iter().skip(3).copied().collect();
    let field = |label: &str| fields.get(label).map(|v| (*v).to_string()).unwrap_or_default();

    let (windows, window_square) = split_item(fields.get(L_WINDOWS).copied().unwrap_or(""));
    let (doors, door_square) = split_item(fields.get(L_DOORS).copied().unwrap_or(""));

    OrderDraft {
        name: positional(0),
        phone: positional(1),
        address: positional(2),
        windows,
        window_square,
        doors,
        door_square,
        profile: field(L_PROFILE),
        color: field(L_COLOR),
        glass: field(L_GLASS),
        net: fields
            .get(L_NET)
            .or_else(|| fields.get(L_NET_ALT))
            .map(|v| (*v).to_string())
            .unwrap_or_else(|| NET_NONE.to_string()),
        sill: field(L_SILL),
        total: parse_decimal(&field(L_TOTAL)),
        deposit: parse_decimal(&field(L_DEPOSIT)),
        rest: parse_decimal(&field(L_REST)),
        install_date: field(L_DATE),
        raw_text: raw.to_string(),
    }
}

/// Split an item value of the form `<description> (<area> м²)`.
///
/// Without a `(` the whole value is the description. The area is whatever
/// sits between `(` and the unit suffix; anything unparsable leaves it `None`.
fn split_item(value: &str) -> (String, Option<f64>) {
    let Some(paren) = value.find('(') else {
        return (value.trim().to_string(), None);
    };
    let description = value[..paren].trim().to_string();
    let area = value[paren + 1..]
        .split(AREA_UNIT)
        .next()
        .and_then(parse_decimal);
    (description, area)
}

// The form emits both "3.5" and "3,5" depending on the client locale.
fn parse_decimal(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "🆕 Yangi buyurtma\n\
        Ism: Ali Valiyev\n\
        Tel: +998 90 123 45 67\n\
        Manzil: Toshkent, Chilonzor 5\n\
        🪟 Derazalar: 2 dona (3,5 м²)\n\
        🚪 Eshiklar: 1 dona (2.1 м²)\n\
        🧱 Profil: Akfa 70\n\
        🎨 Rang: Oq\n\
        🪞 Oyna paketi: 2 kamerali\n\
        🕸 Setka: Bor\n\
        🪵 Podokonnik: 30 sm\n\
        💰 Umumiy summa: 4500000\n\
        💵 Oldindan to'lov: 2000000\n\
        💳 Qolgan summa: 2500000\n\
        📅 O'rnatish sanasi: 15-avgust";

    #[test]
    fn full_payload_populates_every_field() {
        let draft = parse_order(FULL);
        assert_eq!(draft.name, "Ali Valiyev");
        assert_eq!(draft.phone, "+998 90 123 45 67");
        assert_eq!(draft.address, "Toshkent, Chilonzor 5");
        assert_eq!(draft.windows, "2 dona");
        assert_eq!(draft.window_square, Some(3.5));
        assert_eq!(draft.doors, "1 dona");
        assert_eq!(draft.door_square, Some(2.1));
        assert_eq!(draft.profile, "Akfa 70");
        assert_eq!(draft.color, "Oq");
        assert_eq!(draft.glass, "2 kamerali");
        assert_eq!(draft.net, "Bor");
        assert_eq!(draft.sill, "30 sm");
        assert_eq!(draft.total, Some(4_500_000.0));
        assert_eq!(draft.deposit, Some(2_000_000.0));
        assert_eq!(draft.rest, Some(2_500_000.0));
        assert_eq!(draft.install_date, "15-avgust");
        assert_eq!(draft.raw_text, FULL);
    }

    #[test]
    fn first_three_lines_are_positional_regardless_of_labels() {
        let draft = parse_order("Whatever: Ali\nAnything: 123\nFoo: X");
        assert_eq!(draft.name, "Ali");
        assert_eq!(draft.phone, "123");
        assert_eq!(draft.address, "X");
    }

    #[test]
    fn missing_positional_lines_default_to_empty() {
        let draft = parse_order("Ism: Ali");
        assert_eq!(draft.name, "Ali");
        assert_eq!(draft.phone, "");
        assert_eq!(draft.address, "");
    }

    #[test]
    fn missing_labels_degrade_to_defaults() {
        let draft = parse_order("Ism: Ali\nTel: 123\nManzil: X");
        assert_eq!(draft.windows, "");
        assert_eq!(draft.window_square, None);
        assert_eq!(draft.profile, "");
        assert_eq!(draft.total, None);
        assert_eq!(draft.net, NET_NONE);
    }

    #[test]
    fn minimal_payload_with_profile_and_total() {
        let draft =
            parse_order("🆕\nIsm: Ali\nTel: 123\nAddr: X\n🧱 Profil: P1\n💰 Umumiy summa: 1000");
        assert_eq!(draft.name, "Ali");
        assert_eq!(draft.phone, "123");
        assert_eq!(draft.address, "X");
        assert_eq!(draft.profile, "P1");
        assert_eq!(draft.total, Some(1000.0));
        assert_eq!(draft.windows, "");
        assert_eq!(draft.window_square, None);
    }

    #[test]
    fn item_without_parenthesis_keeps_whole_text() {
        let (desc, area) = split_item("3 dona");
        assert_eq!(desc, "3 dona");
        assert_eq!(area, None);
    }

    #[test]
    fn item_area_accepts_dot_and_comma() {
        assert_eq!(split_item("2 dona (3,5 м²)"), ("2 dona".into(), Some(3.5)));
        assert_eq!(split_item("2 dona (3.5 м²)"), ("2 dona".into(), Some(3.5)));
    }

    #[test]
    fn item_area_without_unit_is_absent() {
        assert_eq!(split_item("2 dona (3,5)"), ("2 dona".into(), None));
    }

    #[test]
    fn net_label_variation_selector_form_is_accepted() {
        let plain = parse_order("a: 1\nb: 2\nc: 3\n🕸 Setka: Bor");
        let variant = parse_order("a: 1\nb: 2\nc: 3\n🕸\u{fe0f} Setka: Bor");
        assert_eq!(plain.net, "Bor");
        assert_eq!(variant.net, "Bor");
    }

    #[test]
    fn unparsable_money_is_absent() {
        let draft = parse_order("a: 1\nb: 2\nc: 3\n💰 Umumiy summa: kelishiladi");
        assert_eq!(draft.total, None);
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let draft = parse_order("a: 1\nb: 2\nc: 3\n🎁 Bonus: katta\n🧱 Profil: P1");
        assert_eq!(draft.profile, "P1");
    }

    #[test]
    fn lines_without_separator_are_dropped() {
        let draft = parse_order("just text\nIsm: Ali\nTel: 123\nManzil: X");
        assert_eq!(draft.name, "Ali");
    }

    #[test]
    fn empty_and_garbage_input_do_not_panic() {
        assert_eq!(parse_order("").name, "");
        assert_eq!(parse_order("\n\n\n").name, "");
        let draft = parse_order("::::\n:::");
        assert_eq!(draft.raw_text, "::::\n:::");
    }

    #[test]
    fn marker_line_is_only_dropped_when_leading() {
        let draft = parse_order("Ism: Ali\n🆕 qandaydir: matn\nTel: 123");
        assert_eq!(draft.name, "Ali");
        assert_eq!(draft.phone, "matn");
        assert_eq!(draft.address, "123");
    }
}
