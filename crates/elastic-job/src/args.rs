//! Rendezvous launch argument injection
//!
//! The launch block must sit between the distributed-launch module and the
//! user's script so the launcher, not the script, consumes it. When the
//! launch module is invoked from the container command instead of its args,
//! the whole arg list is the script plus its arguments and the block goes in
//! front.

use crate::replicas::ReplicaRange;

/// Argument naming the distributed launch module (`python -m <sentinel>`)
pub const LAUNCH_SENTINEL: &str = "torchelastic.distributed.launch";

/// Build the rendezvous argument block for one job
pub fn rendezvous_args(
    backend: &str,
    endpoint: &str,
    job_id: &str,
    range: ReplicaRange,
) -> Vec<String> {
    vec![
        format!("--rdzv_backend={backend}"),
        format!("--rdzv_endpoint={endpoint}"),
        format!("--rdzv_id={job_id}"),
        format!("--nnodes={range}"),
    ]
}

/// Position the launch block is inserted at: right after the last sentinel,
/// or 0 when the sentinel is absent.
pub fn insertion_point(args: &[String], sentinel: &str) -> usize {
    args.iter()
        .rposition(|arg| arg == sentinel)
        .map_or(0, |i| i + 1)
}

/// Return `args` with `block` inserted after the last `sentinel`.
///
/// The block is copied as-is: never reordered or deduplicated. Calling this
/// twice on its own output inserts the block twice.
pub fn inject_launch_args_after(args: &[String], block: &[String], sentinel: &str) -> Vec<String> {
    let at = insertion_point(args, sentinel);
    let mut out = Vec::with_capacity(args.len() + block.len());
    out.extend_from_slice(&args[..at]);
    out.extend_from_slice(block);
    out.extend_from_slice(&args[at..]);
    out
}

/// [`inject_launch_args_after`] with the torchelastic launch module as sentinel
pub fn inject_launch_args(args: &[String], block: &[String]) -> Vec<String> {
    inject_launch_args_after(args, block, LAUNCH_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn block_is_prepended_when_sentinel_absent() {
        let args = strings(&["run.py", "--arg1", "val1"]);
        let block = strings(&["--rdvz", "etcd"]);

        assert_eq!(
            inject_launch_args(&args, &block),
            strings(&["--rdvz", "etcd", "run.py", "--arg1", "val1"])
        );
    }

    #[test]
    fn block_follows_sentinel_when_present() {
        let args = strings(&[
            "python",
            "run.py",
            "python",
            "-m",
            "torchelastic.distributed.launch",
            "script.py",
            "--arg1",
            "val1",
        ]);
        let block = strings(&["--rdvz", "etcd"]);

        assert_eq!(
            inject_launch_args(&args, &block),
            strings(&[
                "python",
                "run.py",
                "python",
                "-m",
                "torchelastic.distributed.launch",
                "--rdvz",
                "etcd",
                "script.py",
                "--arg1",
                "val1",
            ])
        );
    }

    #[test]
    fn last_sentinel_wins() {
        let args = strings(&[
            "-m",
            "torchelastic.distributed.launch",
            "wrapper.py",
            "-m",
            "torchelastic.distributed.launch",
            "train.py",
        ]);
        let block = strings(&["--nnodes=1:2"]);

        let out = inject_launch_args(&args, &block);
        assert_eq!(out[4], "torchelastic.distributed.launch");
        assert_eq!(out[5], "--nnodes=1:2");
        assert_eq!(out[6], "train.py");
        assert_eq!(out[2], "wrapper.py");
    }

    #[rstest]
    #[case::empty(&[], 0)]
    #[case::absent(&["train.py"], 0)]
    #[case::first(&["torchelastic.distributed.launch", "train.py"], 1)]
    #[case::trailing(&["-m", "torchelastic.distributed.launch"], 2)]
    #[case::repeated(&["torchelastic.distributed.launch", "torchelastic.distributed.launch"], 2)]
    fn insertion_point_policy(#[case] args: &[&str], #[case] expected: usize) {
        assert_eq!(insertion_point(&strings(args), LAUNCH_SENTINEL), expected);
    }

    #[test]
    fn sentinel_must_match_exactly() {
        let args = strings(&["torchelastic.distributed.launch.py", "train.py"]);
        assert_eq!(insertion_point(&args, LAUNCH_SENTINEL), 0);
    }

    #[test]
    fn injection_does_not_touch_caller_args_and_is_not_idempotent() {
        let args = strings(&["train.py"]);
        let block = strings(&["--a", "--b"]);

        let once = inject_launch_args(&args, &block);
        let twice = inject_launch_args(&once, &block);

        assert_eq!(args, strings(&["train.py"]));
        assert_eq!(twice, strings(&["--a", "--b", "--a", "--b", "train.py"]));
    }

    #[test]
    fn empty_block_leaves_args_unchanged() {
        let args = strings(&["-m", "torchelastic.distributed.launch", "train.py"]);
        assert_eq!(inject_launch_args(&args, &[]), args);
    }

    #[test]
    fn custom_sentinel_is_honored() {
        let args = strings(&["-m", "torch.distributed.run", "train.py"]);
        let out = inject_launch_args_after(&args, &strings(&["--x"]), "torch.distributed.run");
        assert_eq!(out, strings(&["-m", "torch.distributed.run", "--x", "train.py"]));
    }

    #[test]
    fn rendezvous_block_has_fixed_order() {
        let block = rendezvous_args(
            "etcd",
            "etcd-service:2379",
            "imagenet",
            ReplicaRange { min: 1, max: 3 },
        );
        assert_eq!(
            block,
            strings(&[
                "--rdzv_backend=etcd",
                "--rdzv_endpoint=etcd-service:2379",
                "--rdzv_id=imagenet",
                "--nnodes=1:3",
            ])
        );
    }
}
