mod common;
use common::*;

#[test]
fn test_help_flag() {
    let (stdout, _stderr, exit_code) = run_blastmux(&["--help"]);
    assert_eq!(exit_code, 0, "blastmux --help should exit successfully");
    assert!(
        stdout.contains("sequence-search"),
        "Help should describe the tool"
    );
    assert!(
        stdout.contains("--workers"),
        "Help should mention the workers option"
    );
    assert!(
        stdout.contains("--block-size"),
        "Help should mention the block size option"
    );
}

#[test]
fn test_missing_query_is_usage_error() {
    let (_stdout, stderr, exit_code) = run_blastmux(&["cat", "-out", "/tmp/never-written.txt"]);
    assert_eq!(exit_code, 2, "missing -query should be a usage error");
    assert!(stderr.contains("-query"), "stderr should name the missing arg");
    assert!(stderr.contains("Usage:"), "stderr should print usage text");
}

#[test]
fn test_missing_out_is_usage_error() {
    let (_stdout, stderr, exit_code) = run_blastmux(&["cat", "-query", "/tmp/whatever.fa"]);
    assert_eq!(exit_code, 2, "missing -out should be a usage error");
    assert!(stderr.contains("-out"), "stderr should name the missing arg");
}

#[test]
fn test_unreadable_query_file_is_fatal() {
    let ws = Workspace::with_queries(">a\nacgt\n");
    let missing = ws.dir.path().join("no-such-file.fa");
    let (_stdout, stderr, exit_code) = run_blastmux(&[
        "cat",
        "-query",
        missing.to_str().unwrap(),
        "-out",
        ws.out.to_str().unwrap(),
    ]);
    assert_ne!(exit_code, 0);
    assert!(stderr.contains("open query file"));
}

#[test]
fn test_empty_input_creates_empty_output() {
    let ws = Workspace::with_queries("");
    let (_stdout, _stderr, exit_code) = ws.run(&["--workers", "3"], &["cat"]);
    assert_eq!(exit_code, 0, "empty input should succeed");
    assert_eq!(ws.output(), "", "output file must exist and be empty");
}

#[test]
fn test_single_worker_cat_reproduces_input() {
    // With one worker the blocks are searched sequentially, so `cat` output
    // must be byte-identical to the query file.
    let input: String = (0..12).map(|i| fasta_record(i, 200 + i * 13)).collect();
    let ws = Workspace::with_queries(&input);
    let (_stdout, _stderr, exit_code) =
        ws.run(&["--workers", "1", "--block-size", "500"], &["cat"]);
    assert_eq!(exit_code, 0);
    assert_eq!(ws.output(), input);
}

#[test]
fn test_multi_worker_cat_conserves_every_record() {
    let input: String = (0..30).map(|i| fasta_record(i, 150 + i * 11)).collect();
    let ws = Workspace::with_queries(&input);
    let (_stdout, _stderr, exit_code) =
        ws.run(&["--workers", "4", "--block-size", "600"], &["cat"]);
    assert_eq!(exit_code, 0);

    let output = ws.output();
    assert_eq!(output.len(), input.len(), "no byte dropped or duplicated");

    let mut expected = split_records(&input);
    let mut got = split_records(&output);
    expected.sort();
    got.sort();
    assert_eq!(got, expected, "every record must appear exactly once");
}

#[test]
fn test_oversized_record_scenario() {
    // Records of 5000, 5000, and 30000 bytes with a 20000
    // block limit become two blocks; with two workers the output is their
    // concatenation in whichever order the sessions closed.
    let r1 = fasta_record(1, 5000);
    let r2 = fasta_record(2, 5000);
    let r3 = fasta_record(3, 30000);
    let input = format!("{}{}{}", r1, r2, r3);
    let ws = Workspace::with_queries(&input);
    let (_stdout, _stderr, exit_code) =
        ws.run(&["--workers", "2", "--block-size", "20000"], &["cat"]);
    assert_eq!(exit_code, 0);

    let output = ws.output();
    assert_eq!(output.len(), input.len());
    let block1 = format!("{}{}", r1, r2);
    let ordered = format!("{}{}", block1, r3);
    let swapped = format!("{}{}", r3, block1);
    assert!(
        output == ordered || output == swapped,
        "output must be the two blocks, whole, in either order"
    );
}

#[test]
fn test_more_workers_than_blocks_terminates() {
    // One block, six workers: five workers must be finalized without ever
    // receiving work, and the run must still complete.
    let input = fasta_record(1, 100);
    let ws = Workspace::with_queries(&input);
    let (_stdout, _stderr, exit_code) = ws.run(&["--workers", "6"], &["cat"]);
    assert_eq!(exit_code, 0);
    assert_eq!(ws.output(), input);
}

#[test]
fn test_tool_arguments_are_forwarded_verbatim() {
    let input = ">gene_a\nacgtacgt\n>gene_b\nttggccaa\n";
    let ws = Workspace::with_queries(input);
    let (_stdout, _stderr, exit_code) =
        ws.run(&["--workers", "1"], &["tr", "a-z", "A-Z"]);
    assert_eq!(exit_code, 0);
    assert_eq!(ws.output(), input.to_uppercase());
}

#[test]
fn test_small_fragment_size_still_delivers_whole_blocks() {
    let input: String = (0..6).map(|i| fasta_record(i, 300)).collect();
    let ws = Workspace::with_queries(&input);
    let (_stdout, _stderr, exit_code) = ws.run(
        &["--workers", "1", "--block-size", "700", "--fragment-size", "37"],
        &["cat"],
    );
    assert_eq!(exit_code, 0);
    assert_eq!(ws.output(), input);
}

#[test]
fn test_missing_search_tool_is_fatal() {
    let ws = Workspace::with_queries(">a\nacgt\n");
    let (_stdout, stderr, exit_code) =
        ws.run(&["--workers", "1"], &["/nonexistent/search-tool"]);
    assert_ne!(exit_code, 0, "a tool that cannot launch must fail the run");
    assert!(stderr.contains("failed to launch"));
}

#[test]
fn test_malformed_input_without_final_newline_is_fatal() {
    let ws = Workspace::with_queries(">a\nacgt");
    let (_stdout, stderr, exit_code) = ws.run(&["--workers", "1"], &["cat"]);
    assert_ne!(exit_code, 0);
    assert!(stderr.contains("incomplete last line"));
}
