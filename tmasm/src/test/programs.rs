use super::lines;
use crate::{compile, source_to_assembly};
use num::bigint::BigInt;
use tmvm::{decode_output, encode_input, MultiTapeMachine, RunResult};

fn big(n: i64) -> BigInt {
    BigInt::from(n)
}

fn run(source: &str, input: &[i64], max_steps: u64) -> (MultiTapeMachine, Vec<BigInt>) {
    let mut machine = compile(&lines(source)).unwrap();
    let values: Vec<BigInt> = input.iter().map(|&n| big(n)).collect();
    machine.set_input(&encode_input(&values)).unwrap();

    let result = machine.run(Some(max_steps));
    assert_eq!(
        result,
        RunResult::Halted,
        "not halted after {} steps",
        machine.steps()
    );

    let output = decode_output(&machine.tape(crate::OUTPUT_TAPE).contents()).unwrap();
    (machine, output)
}

#[test]
fn constant_return() {
    let (machine, output) = run("int main() { return 0; }", &[], 2_000_000);

    assert!(output.is_empty());
    // the return value tape is the last of the roster and holds zero
    let rax = machine.num_tapes() - 1;
    assert_eq!(machine.tape(rax).contents(), "0");
}

#[test]
fn echo() {
    let source = "int main() {
        int x = nextInt();
        printInt(x);
        printSpace();
        return 0;
    }";
    let (machine, output) = run(source, &[2], 2_000_000);

    assert_eq!(output, vec![big(2)]);
    assert_eq!(machine.tape(crate::OUTPUT_TAPE).contents(), "001");
}

#[test]
fn iterative_sum() {
    let source = "int main() {
        int N = nextInt();
        int s = 0;
        for (int i = 0; i < N; i += 1) {
            s += nextInt();
        }
        printInt(s);
        printSpace();
        return 0;
    }";
    let (_, output) = run(source, &[5, 9, 5, 8, 2, 5], 80_000_000);

    assert_eq!(output, vec![big(29)]);
}

#[test]
fn short_circuit_skips_the_division() {
    let source = "int main() {
        int x = 0;
        if (x != 0 && 10 / x > 0) {
            printInt(1);
        } else {
            printInt(0);
        }
        printSpace();
        return 0;
    }";
    // a taken division by zero would never terminate, so halting inside the
    // step bound is the property
    let (_, output) = run(source, &[], 20_000_000);

    assert_eq!(output, vec![big(0)]);
}

#[test]
fn negative_values_round_trip() {
    let source = "int main() {
        int x = nextInt();
        printInt(0 - x);
        printSpace();
        return 0;
    }";
    let (_, output) = run(source, &[17], 20_000_000);

    assert_eq!(output, vec![big(-17)]);
}

#[test]
fn comparison_after_subtraction() {
    // exercises the normalization of subtraction results: the difference
    // must compare equal to itself afterwards
    let source = "int main() {
        int a = nextInt();
        int b = a - 3;
        if (b == a - 3) {
            printInt(1);
        } else {
            printInt(0);
        }
        printSpace();
        return 0;
    }";
    let (_, output) = run(source, &[10], 40_000_000);

    assert_eq!(output, vec![big(1)]);
}

#[test]
fn mem_round_trips_values() {
    let source = "int main() {
        MEM[0] = 5;
        MEM[1] = 0 - 3;
        printInt(MEM[0]);
        printSpace();
        printInt(MEM[1]);
        printSpace();
        return 0;
    }";
    let (_, output) = run(source, &[], 120_000_000);

    assert_eq!(output, vec![big(5), big(-3)]);
}

#[test]
#[ignore] // multi-minute simulation
fn factorial_of_five() {
    let source = "int f(int n) {
        if (n == 0 || n == 1) {
            return 1;
        }
        return n * f(n - 1);
    }
    int main() {
        printInt(f(5));
        printSpace();
        return 0;
    }";
    let (_, output) = run(source, &[5], 4_000_000_000);

    assert_eq!(output, vec![big(120)]);
}

#[test]
#[ignore] // multi-minute simulation
fn bfs_distances() {
    let source = "int main() {
        int numNodes = nextInt();
        int numEdges = nextInt();
        int startNode = nextInt() - 1;

        for (int i = 0; i < numEdges; i += 1) {
            MEM[2 * i] = nextInt() - 1;
            MEM[2 * i + 1] = nextInt() - 1;
        }

        for (int i = 0; i < numNodes; i += 1) {
            MEM[2 * numEdges + i] = numNodes;
        }
        MEM[2 * numEdges + startNode] = 0;

        int queueHead = 2 * numEdges + numNodes;
        int queueTail = queueHead + 1;
        MEM[queueHead] = startNode;

        while (queueHead != queueTail) {
            int node = MEM[queueHead];
            queueHead += 1;

            for (int i = 0; i < numEdges; i += 1) {
                int u = MEM[2 * i];
                int v = MEM[2 * i + 1];
                int neighbor = 0 - 1;

                if (u == node) {
                    neighbor = v;
                } else if (v == node) {
                    neighbor = u;
                }

                if (neighbor != 0 - 1) {
                    if (MEM[2 * numEdges + neighbor] == numNodes) {
                        MEM[2 * numEdges + neighbor] = 1 + MEM[2 * numEdges + node];
                        MEM[queueTail] = neighbor;
                        queueTail += 1;
                    }
                }
            }
        }

        for (int i = 0; i < numNodes; i += 1) {
            int dist = MEM[2 * numEdges + i];
            if (dist == numNodes) {
                printInt(0 - 1);
            } else {
                printInt(dist);
            }
            printSpace();
        }

        return 0;
    }";
    let (_, output) = run(source, &[5, 3, 1, 1, 2, 1, 3, 3, 4], 200_000_000_000);

    assert_eq!(
        output,
        vec![big(0), big(1), big(1), big(2), big(-1)]
    );
}

#[test]
fn undeclared_function_is_an_unknown_token() {
    let source = "int main() { return foo(5); }";
    match source_to_assembly(&lines(source)) {
        Err(crate::Error::UnknownToken { name }) => assert_eq!(name, "foo"),
        other => panic!("expected an unknown-token error, got {:?}", other),
    }
}

#[test]
fn undeclared_variable_is_an_unknown_token() {
    let source = "int main() { int x = y + 1; return x; }";
    match source_to_assembly(&lines(source)) {
        Err(crate::Error::UnknownToken { name }) => assert_eq!(name, "y"),
        other => panic!("expected an unknown-token error, got {:?}", other),
    }
}

// The assembly of a lowered program only uses the documented instruction
// shapes; spot-check the mix.
#[test]
fn assembly_uses_only_known_shapes() {
    let source = "int main() {
        int x = nextInt();
        if (x > 0) {
            printInt(x);
        }
        printSpace();
        return 0;
    }";
    let assembly = source_to_assembly(&lines(source)).unwrap();

    assert!(assembly.iter().any(|l| l.starts_with("jmp ")));
    assert!(assembly.iter().any(|l| l.starts_with("jf ")));
    assert!(assembly.iter().any(|l| l.starts_with("push ")));
    assert!(assembly.iter().any(|l| l.starts_with("pop ")));
    assert!(assembly.iter().any(|l| l.starts_with("call ")));
    assert!(assembly.iter().any(|l| l.trim() == "return ;"));
    assert!(assembly.iter().any(|l| l.trim() == "nop ;"));
}
