use serenity::builder::CreateEmbed;

pub fn error(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(message)
        .color(0xED4245)
}

pub fn success(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("✅ Done")
        .description(message)
        .color(0x57F287)
}

pub fn warning(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("⚠️ Warning")
        .description(message)
        .color(0xFEE75C)
}

pub fn info(title: &str, message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(message)
        .color(0x5865F2)
}
