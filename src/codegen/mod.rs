//! JavaScript code generation
//!
//! Renders a checked [`Program`] as JavaScript source lines. Every declared
//! entity is emitted as `name_N`, where N is the order in which the
//! generator first meets it, so shadowed or reused PANIC names never clash
//! in the output and never collide with JavaScript reserved words.

pub mod context;
mod expressions;
mod statements;

pub use context::JsGenerator;
pub use expressions::{expand_range, render_number, MAX_EXPANDED_RANGE};

use crate::ir::Program;
use log::debug;

pub fn generate(program: &Program, indent_width: usize) -> Vec<String> {
    let mut generator = JsGenerator::new(&program.entities, indent_width);
    generator.generate_block(&program.statements);
    debug!("generated {} lines for {} entities", generator.lines.len(), generator.names.len());
    generator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser, semantic};

    fn js(source: &str) -> Vec<String> {
        let tokens = lexer::lex(source).unwrap();
        let cst = parser::parse(source, tokens).unwrap();
        let program = semantic::analyze(&cst).unwrap();
        generate(&program, 2)
    }

    #[test]
    fn test_declarations_and_assignment() {
        assert_eq!(
            js("im x: 3 mu y: 4 y: x"),
            vec!["const x_1 = 3;", "let y_2 = 4;", "y_2 = x_1;"]
        );
    }

    #[test]
    fn test_print_intrinsics() {
        assert_eq!(
            js("p(\"a\" 1) pl 2 print(true)"),
            vec!["console.log(\"a\", 1);", "console.log(2);", "console.log(true);"]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            js("mu a: 1 p(a = 2 and !(a != 3) or a ** 2 >= 4)"),
            vec![
                "let a_1 = 1;",
                "console.log((((a_1 === 2) && !(a_1 !== 3)) || ((a_1 ** 2) >= 4)));",
            ]
        );
        assert_eq!(js("mu a: 2 p(-a ** 2)"), vec!["let a_1 = 2;", "console.log(((-a_1) ** 2));"]);
    }

    #[test]
    fn test_if_chain() {
        assert_eq!(
            js("mu x: 1 if x = 1 { p 1 } elif x < 1 { p 2 } else { p 3 }"),
            vec![
                "let x_1 = 1;",
                "if (x_1 === 1) {",
                "  console.log(1);",
                "}",
                "else if (x_1 < 1) {",
                "  console.log(2);",
                "}",
                "else {",
                "  console.log(3);",
                "}",
            ]
        );
    }

    #[test]
    fn test_loops() {
        assert_eq!(
            js("mu n: 3 l i in [0...n] { p i } l j in n { b } l k in [10...1, -3] { p k }"),
            vec![
                "let n_1 = 3;",
                "for (let i_2 = 0; i_2 <= n_1; i_2 += 1) {",
                "  console.log(i_2);",
                "}",
                "for (let j_3 = 1; j_3 <= n_1; j_3 += 1) {",
                "  break;",
                "}",
                "for (let k_4 = 10; k_4 >= 1; k_4 -= 3) {",
                "  console.log(k_4);",
                "}",
            ]
        );
        assert_eq!(
            js("l ch in \"ab\" { p ch } mu go: true l go { go: false }"),
            vec![
                "for (const ch_1 of \"ab\") {",
                "  console.log(ch_1);",
                "}",
                "let go_2 = true;",
                "while (go_2) {",
                "  go_2 = false;",
                "}",
            ]
        );
    }

    #[test]
    fn test_functions_and_default_arguments() {
        assert_eq!(
            js("f g(a: 1 b int c: 2) -> int { r a + b + c } p(g(5)) p(g(1 2 3))"),
            vec![
                "function g_1(a_2 = 1, b_3, c_4 = 2) {",
                "  return ((a_2 + b_3) + c_4);",
                "}",
                "console.log(g_1(undefined, 5));",
                "console.log(g_1(1, 2, 3));",
            ]
        );
    }

    #[test]
    fn test_classes() {
        assert_eq!(
            js("c Dog { con(name string) f bark(sound string) { p(name sound) } } \
                im d: Dog(\"rex\") d.bark(\"woof\") p d.name"),
            vec![
                "class Dog_1 {",
                "  constructor(name_2) {",
                "    this.name_2 = name_2;",
                "  }",
                "  bark_3(sound_4) {",
                "    console.log(this.name_2, sound_4);",
                "  }",
                "}",
                "const d_5 = new Dog_1(\"rex\");",
                "d_5.bark_3(\"woof\");",
                "console.log(d_5.name_2);",
            ]
        );
    }

    #[test]
    fn test_constructor_defaults_name_earlier_parameters() {
        assert_eq!(
            js("c P { con(a int z: a) } im q: P(5) p(q.z)"),
            vec![
                "class P_1 {",
                "  constructor(a_2, z_3 = a_2) {",
                "    this.a_2 = a_2;",
                "    this.z_3 = z_3;",
                "  }",
                "}",
                "const q_4 = new P_1(5);",
                "console.log(q_4.z_3);",
            ]
        );
    }

    #[test]
    fn test_condition_parentheses_follow_expression_shape() {
        let lines = js(
            "c C { con(n int) f ok(x string) -> boolean { r x = \")\" } } \
             im d: C(1) im e: C(2) im s: \"(\" \
             if (s = \"(\" ? d : e).ok(\")\") { p 1 } \
             l s = \")\" or s != \"(\" { b }",
        );
        assert_eq!(
            lines[8..],
            [
                "const d_5 = new C_1(1);",
                "const e_6 = new C_1(2);",
                "const s_7 = \"(\";",
                "if (((s_7 === \"(\") ? d_5 : e_6).ok_3(\")\")) {",
                "  console.log(1);",
                "}",
                "while ((s_7 === \")\") || (s_7 !== \"(\")) {",
                "  break;",
                "}",
            ]
        );
        assert_eq!(lines[5], "    return (x_4 === \")\");");
    }

    #[test]
    fn test_arrays_and_ranges() {
        assert_eq!(
            js("im xs: [[1, 2], [3, 4]] p(xs[0][1]) p(xs[0...1]) im ys: [1...20, *2] im zs: []"),
            vec![
                "const xs_1 = [[1, 2], [3, 4]];",
                "console.log(xs_1[0][1]);",
                "console.log(xs_1.slice(0, 1 + 1));",
                "const ys_2 = [1, 2, 4, 8, 16];",
                "const zs_3 = [];",
            ]
        );
        assert_eq!(
            js("mu n: 4 im xs: [1...n]"),
            vec![
                "let n_1 = 4;",
                "const xs_2 = (() => { const values = []; for (let v = 1; v <= n_1; v += 1) { values.push(v); } return values; })();",
            ]
        );
    }

    #[test]
    fn test_shadowed_names_stay_distinct() {
        assert_eq!(
            js("im x: 1 if true { im x: \"inner\" p x } p x"),
            vec![
                "const x_1 = 1;",
                "if (true) {",
                "  const x_2 = \"inner\";",
                "  console.log(x_2);",
                "}",
                "console.log(x_1);",
            ]
        );
    }

    #[test]
    fn test_conditional_expression() {
        assert_eq!(
            js("mu n: 5 im s: n > 3 ? \"big\" : \"small\""),
            vec!["let n_1 = 5;", "const s_2 = ((n_1 > 3) ? \"big\" : \"small\");"]
        );
    }
}
