//! Versioned property history on files and directories.

use super::Mutation::{CreateDir, Svn, WriteFile};
use super::{Scenario, Step, StepSlot};

pub static PROPS: Scenario = Scenario {
    name: "props",
    info: "Property additions, changes and deletions on files and directories",
    slots: &[
        // 0
        StepSlot::Active(Step {
            summary: "add dir1 with file1",
            mutations: &[
                CreateDir("dir1"),
                WriteFile("dir1/file1", b"hello1\n"),
                Svn(&["add", "dir1"]),
            ],
        }),
        // 1
        StepSlot::Active(Step {
            summary: "set three properties on dir1/file1",
            mutations: &[
                Svn(&["propset", "copyright", "(c) ME", "dir1/file1"]),
                Svn(&["propset", "license", "public domain", "dir1/file1"]),
                Svn(&["propset", "bla", "blubb", "dir1/file1"]),
            ],
        }),
        // 2
        StepSlot::Active(Step {
            summary: "ignore object files in dir1",
            mutations: &[
                Svn(&["up"]),
                Svn(&["propset", "svn:ignore", "*.o", "dir1"]),
            ],
        }),
        // 3
        StepSlot::Active(Step {
            summary: "add dir2 with an externals definition",
            mutations: &[
                CreateDir("dir2"),
                Svn(&["add", "dir2"]),
                Svn(&[
                    "propset",
                    "svn:externals",
                    "ext/test    http://svn.collab.net/repos/svn/trunk/",
                    "dir2",
                ]),
            ],
        }),
        // 4
        StepSlot::Active(Step {
            summary: "add nested dir3 with an externals definition",
            mutations: &[
                CreateDir("dir3"),
                CreateDir("dir3/subdir"),
                WriteFile("dir3/subdir/file1", b"hello1\n"),
                Svn(&["add", "dir3"]),
                Svn(&[
                    "propset",
                    "svn:externals",
                    "ext/subversion    http://svn.collab.net/repos/svn/trunk/",
                    "dir3",
                ]),
            ],
        }),
        // 5
        StepSlot::Active(Step {
            summary: "native eol-style on dir1/file1",
            mutations: &[Svn(&["propset", "svn:eol-style", "native", "dir1/file1"])],
        }),
        // 6
        StepSlot::Active(Step {
            summary: "drop svn:ignore from dir1",
            mutations: &[
                Svn(&["up", "--ignore-externals"]),
                Svn(&["propdel", "svn:ignore", "dir1"]),
            ],
        }),
        // 7
        StepSlot::Active(Step {
            summary: "edit dir1/file1 and switch to LF",
            mutations: &[
                WriteFile("dir1/file1", b"hello2\n"),
                Svn(&["propset", "svn:eol-style", "LF", "dir1/file1"]),
            ],
        }),
        // 8
        StepSlot::Active(Step {
            summary: "delete copyright from dir1/file1",
            mutations: &[Svn(&["propdel", "copyright", "dir1/file1"])],
        }),
        // 9: copies are not covered yet
        StepSlot::Retired(Step {
            summary: "copy dir3 to dir4",
            mutations: &[Svn(&["cp", "dir3", "dir4"])],
        }),
        // 10
        StepSlot::Retired(Step {
            summary: "move dir1 into dir4 and ignore archives",
            mutations: &[
                Svn(&["up"]),
                Svn(&["mv", "dir1", "dir4"]),
                Svn(&["propset", "svn:ignore", "*.[oa]", "dir4"]),
            ],
        }),
        // 11
        StepSlot::Retired(Step {
            summary: "rename dir4/file1",
            mutations: &[Svn(&["up"]), Svn(&["mv", "dir4/file1", "dir4/file2"])],
        }),
    ],
};
