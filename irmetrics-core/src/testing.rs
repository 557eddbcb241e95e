//! Shared test fixtures: a small hello-world program as IR, plus helpers to
//! lay it out as a snapshot classpath.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ir::{IrBody, IrClass, IrField, IrMethod, IrStatement};

pub const PKG: &str = "de.fraunhofer.iem";
pub const APP: &str = "de.fraunhofer.iem.App";
pub const HELLO_PRINTER: &str = "de.fraunhofer.iem.HelloPrinter";
pub const WITH_NAME: &str = "de.fraunhofer.iem.HelloPrinterWithName";
pub const WITH_MESSAGE: &str = "de.fraunhofer.iem.HelloPrinterWithMessage";

pub const GET_PRINTER: &str =
    "<de.fraunhofer.iem.App: de.fraunhofer.iem.HelloPrinter getPrinter(java.lang.String[])>";
pub const SYSTEM_EXIT: &str = "<java.lang.System: void exit(int)>";
pub const PRINT_HELLO: &str = "<de.fraunhofer.iem.HelloPrinter: void printHelloWorld()>";
pub const PRINTLN: &str = "<java.io.PrintStream: void println(java.lang.String)>";
pub const OBJECT_INIT: &str = "<java.lang.Object: void <init>()>";

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh, empty directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir()
        .join("irmetrics_tests")
        .join(format!("{}_{}_{}", name, std::process::id(), id));
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn constructor(super_init: &str, this_type: &str, line: u32) -> IrMethod {
    IrMethod::new("<init>", "void", &[])
        .with_modifiers(&["public"])
        .with_start_line(line)
        .with_body(
            IrBody::new()
                .with_local("r0", this_type)
                .with_statement(IrStatement::plain(format!("r0 := @this: {}", this_type), Some(line)))
                .with_statement(IrStatement::call(
                    format!("specialinvoke r0.{}()", super_init),
                    super_init,
                    Some(line),
                ))
                .with_statement(IrStatement::plain("return", Some(line))),
        )
}

/// `App.main` calls `getPrinter` on line 13, `System.exit` on line 16 and
/// `printHelloWorld` on line 19.
pub fn app() -> IrClass {
    let main = IrMethod::new("main", "void", &["java.lang.String[]"])
        .with_modifiers(&["public", "static"])
        .with_start_line(11)
        .with_body(
            IrBody::new()
                .with_local("r0", "java.lang.String[]")
                .with_local("$stack1", HELLO_PRINTER)
                .with_local("r1", HELLO_PRINTER)
                .with_statement(IrStatement::plain(
                    "r0 := @parameter0: java.lang.String[]",
                    Some(11),
                ))
                .with_statement(IrStatement::call(
                    format!("$stack1 = staticinvoke {}(r0)", GET_PRINTER),
                    GET_PRINTER,
                    Some(13),
                ))
                .with_statement(IrStatement::plain("r1 = $stack1", Some(13)))
                .with_statement(IrStatement::plain("if r1 != null goto label1", Some(14)))
                .with_statement(IrStatement::call(
                    format!("staticinvoke {}(1)", SYSTEM_EXIT),
                    SYSTEM_EXIT,
                    Some(16),
                ))
                .with_statement(IrStatement::call(
                    format!("label1: virtualinvoke r1.{}()", PRINT_HELLO),
                    PRINT_HELLO,
                    Some(19),
                ))
                .with_statement(IrStatement::plain("return", Some(20))),
        );

    let with_name_init = "<de.fraunhofer.iem.HelloPrinterWithName: void <init>(java.lang.String)>";
    let get_printer = IrMethod::new("getPrinter", HELLO_PRINTER, &["java.lang.String[]"])
        .with_modifiers(&["private", "static"])
        .with_start_line(23)
        .with_body(
            IrBody::new()
                .with_local("l0", "java.lang.String[]")
                .with_local("$stack1", "int")
                .with_local("$stack2", WITH_NAME)
                .with_local("r1", "java.lang.String")
                .with_statement(IrStatement::plain(
                    "l0 := @parameter0: java.lang.String[]",
                    Some(23),
                ))
                .with_statement(IrStatement::plain("$stack1 = lengthof l0", Some(24)))
                .with_statement(IrStatement::plain("if $stack1 != 0 goto label1", Some(24)))
                .with_statement(IrStatement::plain("return null", Some(25)))
                .with_statement(IrStatement::plain("label1: r1 = l0[0]", Some(26)))
                .with_statement(IrStatement::plain(
                    format!("$stack2 = new {}", WITH_NAME),
                    Some(27),
                ))
                .with_statement(IrStatement::call(
                    format!("specialinvoke $stack2.{}(r1)", with_name_init),
                    with_name_init,
                    Some(27),
                ))
                .with_statement(IrStatement::plain("return $stack2", Some(27))),
        );

    IrClass::new(APP)
        .with_superclass("java.lang.Object")
        .with_modifiers(&["public"])
        .with_method(constructor(OBJECT_INIT, APP, 7))
        .with_method(main)
        .with_method(get_printer)
}

fn print_line(this_type: &str, message: &str, line: u32) -> IrBody {
    IrBody::new()
        .with_local("r0", this_type)
        .with_local("$stack1", "java.io.PrintStream")
        .with_statement(IrStatement::plain(format!("r0 := @this: {}", this_type), Some(line)))
        .with_statement(IrStatement::plain(
            "$stack1 = <java.lang.System: java.io.PrintStream out>",
            Some(line),
        ))
        .with_statement(IrStatement::call(
            format!("virtualinvoke $stack1.{}(\"{}\")", PRINTLN, message),
            PRINTLN,
            Some(line),
        ))
        .with_statement(IrStatement::plain("return", Some(line + 1)))
}

pub fn hello_printer() -> IrClass {
    IrClass::new(HELLO_PRINTER)
        .with_superclass("java.lang.Object")
        .with_modifiers(&["public"])
        .with_method(constructor(OBJECT_INIT, HELLO_PRINTER, 3))
        .with_method(
            IrMethod::new("printHelloWorld", "void", &[])
                .with_modifiers(&["public"])
                .with_start_line(5)
                .with_body(print_line(HELLO_PRINTER, "Hello World!", 6)),
        )
}

pub fn hello_printer_with_name() -> IrClass {
    let printer_init = "<de.fraunhofer.iem.HelloPrinter: void <init>()>";
    let init = IrMethod::new("<init>", "void", &["java.lang.String"])
        .with_modifiers(&["public"])
        .with_start_line(7)
        .with_body(
            IrBody::new()
                .with_local("r0", WITH_NAME)
                .with_local("r1", "java.lang.String")
                .with_statement(IrStatement::plain(format!("r0 := @this: {}", WITH_NAME), Some(7)))
                .with_statement(IrStatement::plain(
                    "r1 := @parameter0: java.lang.String",
                    Some(7),
                ))
                .with_statement(IrStatement::call(
                    format!("specialinvoke r0.{}()", printer_init),
                    printer_init,
                    Some(8),
                ))
                .with_statement(IrStatement::plain(
                    "r0.<de.fraunhofer.iem.HelloPrinterWithName: java.lang.String name> = r1",
                    Some(9),
                ))
                .with_statement(IrStatement::plain("return", Some(10))),
        );

    IrClass::new(WITH_NAME)
        .with_superclass(HELLO_PRINTER)
        .with_modifiers(&["public"])
        .with_field(IrField::new("name", "java.lang.String").with_modifiers(&["private", "final"]))
        .with_method(init)
        .with_method(
            IrMethod::new("printHelloWorld", "void", &[])
                .with_modifiers(&["public"])
                .with_start_line(12)
                .with_body(print_line(WITH_NAME, "Hello name!", 13)),
        )
}

/// Carries a native method, so it has one body-less method.
pub fn hello_printer_with_message() -> IrClass {
    IrClass::new(WITH_MESSAGE)
        .with_superclass(HELLO_PRINTER)
        .with_interface("java.io.Serializable")
        .with_modifiers(&["public"])
        .with_method(constructor(
            "<de.fraunhofer.iem.HelloPrinter: void <init>()>",
            WITH_MESSAGE,
            4,
        ))
        .with_method(
            IrMethod::new("printHelloWorld", "void", &[])
                .with_modifiers(&["public"])
                .with_start_line(6)
                .with_body(print_line(WITH_MESSAGE, "Hello message!", 7)),
        )
        .with_method(IrMethod::new("clock", "long", &[]).with_modifiers(&["public", "native"]))
}

/// Every class of the fixture program, in name order.
pub fn hello_world() -> Vec<IrClass> {
    vec![
        app(),
        hello_printer(),
        hello_printer_with_message(),
        hello_printer_with_name(),
    ]
}

/// Writes `classes` as `*.class.json` snapshots below `classpath`.
pub fn write_classpath(classpath: &Path, classes: &[IrClass]) {
    for class in classes {
        let file = classpath.join(format!("{}.class.json", class.name.replace('.', "/")));
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, serde_json::to_string_pretty(class).unwrap()).unwrap();
    }
}

/// Temp classpath holding the hello-world program.
pub fn hello_world_classpath(name: &str) -> PathBuf {
    let classpath = temp_dir(name).join("classes");
    write_classpath(&classpath, &hello_world());
    classpath
}
