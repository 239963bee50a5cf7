fn main() -> anyhow::Result<()> {
    chat_archive_explorer::cli::run()
}
