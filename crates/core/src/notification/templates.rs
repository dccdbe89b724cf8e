//! Message bodies for technician and customer notifications

use leadflow_domain::constants::EMPTY_PLACEHOLDER;
use leadflow_domain::{Lead, NotificationKind, OperationContext, SmsConfig};

const REPEAT_REQUEST_WARNING: &str = "\n\n🔴 <b>Eslatma</b>\nMazkur zayavka bo‘yicha servis \
     xizmati ko‘rsatilganiga qaramasdan, texnik muammo takrorlanganligi sababli ushbu zayavka \
     uchun haq hisoblanmaydi. Kelgusida bunday holatlar yuzaga kelmasligi uchun har bir \
     zayavkaga professional va mas’uliyat bilan yondashishingizni so‘raymiz. Rahmat.";

/// Telegram HTML body for `kind`.
pub fn telegram_body(kind: NotificationKind, lead: &Lead, ctx: &OperationContext) -> String {
    match kind {
        NotificationKind::NewRequest => new_request_html(lead, ctx),
        NotificationKind::Won => won_html(lead, ctx),
    }
}

/// Customer SMS text for `kind`.
pub fn sms_body(kind: NotificationKind, lead: &Lead, config: &SmsConfig) -> String {
    let template = match kind {
        NotificationKind::NewRequest => &config.new_request_template,
        NotificationKind::Won => &config.won_template,
    };
    template
        .replace("{service_number}", lead.service_number.as_deref().unwrap_or(EMPTY_PLACEHOLDER))
        .replace("{name}", &lead.name)
}

fn new_request_html(lead: &Lead, ctx: &OperationContext) -> String {
    format!(
        "🆕 <b>Yangi zayavka</b>\n\n\
         📄 <b>Murojaat:</b> {name}\n\
         🔢 <b>Service #:</b> {number}\n\
         ☎️ <b>Telefon:</b> {phone}\n\
         📍 <b>Manzil:</b> {address}\n\n\
         🕒 <b>Yaratilgan:</b> {created}\n\
         👤 <b>Mas’ul:</b> {responsible}\n\
         \n Zayavkani qabul qilish uchun Aktive zayavkalar bo'limini tanlang!",
        name = escape(or_placeholder(Some(lead.name.as_str()))),
        number = escape(or_placeholder(lead.service_number.as_deref())),
        phone = escape(lead.contact_phone()),
        address = escape(&lead.address()),
        created = ctx.format_local(lead.created_at),
        responsible = escape(or_placeholder(lead.responsible.as_deref())),
    )
}

fn won_html(lead: &Lead, ctx: &OperationContext) -> String {
    let warning = if lead.repeat_request { REPEAT_REQUEST_WARNING } else { "" };
    format!(
        "✅ <b>Tasdiqlandi</b>\n\n\
         📄 <b>Murojaat:</b> {name}\n\
         🔢 <b>Seriya raqami:</b> {number}\n\
         ☎️ <b>Telefon:</b> {phone}\n\
         📍 <b>Manzil:</b> {address}\n\n\
         🕒 <b>Tasdiqlangan:</b> {confirmed}\n\
         👤 <b>Mas’ul xodim:</b> {responsible}\n\
         🖊️ <b>Tasdiqlagan:</b> {operator}{warning}",
        name = escape(or_placeholder(Some(lead.name.as_str()))),
        number = escape(or_placeholder(lead.service_number.as_deref())),
        phone = escape(lead.contact_phone()),
        address = escape(&lead.address()),
        confirmed = ctx.local_now(),
        responsible = escape(or_placeholder(lead.responsible.as_deref())),
        operator = escape(or_placeholder(ctx.actor_name.as_deref())),
    )
}

fn or_placeholder(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(EMPTY_PLACEHOLDER)
}

/// Telegram HTML mode rejects unescaped `<`, `>` and `&`.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
