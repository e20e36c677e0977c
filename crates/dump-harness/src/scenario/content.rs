//! Plain content history: nested adds, edits, binaries, keyword properties.

use super::Mutation::{CreateDir, Svn, WriteFile};
use super::{Scenario, Step, StepSlot};

pub static CONTENT: Scenario = Scenario {
    name: "content",
    info: "File content history with nested directories, binaries and keywords",
    slots: &[
        StepSlot::Active(Step {
            summary: "add trunk with README",
            mutations: &[
                CreateDir("trunk"),
                WriteFile("trunk/README", b"dumpcheck fixture\n"),
                Svn(&["add", "trunk"]),
            ],
        }),
        StepSlot::Active(Step {
            summary: "add trunk/src with two sources",
            mutations: &[
                CreateDir("trunk/src"),
                WriteFile(
                    "trunk/src/main.c",
                    b"#include \"util.h\"\n\nint main(void)\n{\n\treturn util();\n}\n",
                ),
                WriteFile("trunk/src/util.h", b"int util(void);\n"),
                Svn(&["add", "trunk/src"]),
            ],
        }),
        StepSlot::Active(Step {
            summary: "expand Id keyword in main.c",
            mutations: &[
                WriteFile(
                    "trunk/src/main.c",
                    b"/* $Id$ */\n#include \"util.h\"\n\nint main(void)\n{\n\treturn util();\n}\n",
                ),
                Svn(&["propset", "svn:keywords", "Id", "trunk/src/main.c"]),
            ],
        }),
        StepSlot::Active(Step {
            summary: "add a binary file",
            mutations: &[
                WriteFile("trunk/logo.bin", b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\xff\xfe"),
                Svn(&["add", "trunk/logo.bin"]),
                Svn(&["propset", "svn:mime-type", "application/octet-stream", "trunk/logo.bin"]),
            ],
        }),
        StepSlot::Active(Step {
            summary: "multi-line edit after update",
            mutations: &[
                Svn(&["up"]),
                WriteFile(
                    "trunk/src/util.h",
                    b"#ifndef UTIL_H\n#define UTIL_H\n\nint util(void);\n\n#endif\n",
                ),
                WriteFile("trunk/README", b"dumpcheck fixture\n\nsecond paragraph\n"),
            ],
        }),
        StepSlot::Active(Step {
            summary: "truncate README and drop the binary mime-type",
            mutations: &[
                WriteFile("trunk/README", b""),
                Svn(&["propdel", "svn:mime-type", "trunk/logo.bin"]),
            ],
        }),
    ],
};
