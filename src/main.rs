use paddock::error::AppResult;

fn main() -> AppResult<()> {
    paddock::run()
}
