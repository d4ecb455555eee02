pub mod deployment;
pub mod release;

pub type CmdResult<T> = slipway::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (slipway::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Deployment(args) => {
            crate::output::map_cmd_result_to_json(deployment::run(args, global))
        }
        crate::Commands::Release(args) => {
            crate::output::map_cmd_result_to_json(release::run(args, global))
        }
    }
}
