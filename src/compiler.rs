//! Clause-to-script lowering
//!
//! [`compile`] turns one clause into a script fragment while recording the
//! witness-stack slots it needs. [`compile_branches`] compiles each
//! alternative branch of a contract and assembles the fragments into the
//! single program all branches spend through.

use bitcoin::opcodes::all::{
    OP_CHECKSIGVERIFY, OP_CLTV, OP_CSV, OP_DROP, OP_ELSE, OP_ENDIF, OP_EQUALVERIFY, OP_IF,
    OP_NOP4, OP_PUSHNUM_1, OP_SHA256,
};
use bitcoin::opcodes::Opcode;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::ScriptBuf;
use crate::clause::{Clause, TimeSpec, Variable};
use crate::error::CompileError;
use crate::fields::FieldValue;
use crate::template::TemplateHash;
use crate::witness::{WitnessManager, WitnessName, WitnessTemplate};
use log::debug;

/// Slot-name marker for signatures; the key name follows the marker
const SIGNATURE_MARKER: &str = "_signature_by_";

/// Slot-name marker for hash preimages; the digest name follows the marker
const PREIMAGE_MARKER: &str = "_preimage_of_";

/// Lower a single clause into a script fragment
///
/// Slots the spender must fill at spend time are appended to `witness` as a
/// side effect, in the order the script consumes them.
///
/// # Errors
///
/// Returns a [`CompileError`] if a variable that must be resolved is not,
/// resolves to the wrong kind of value, or cannot be pushed.
pub fn compile(clause: &Clause, witness: &mut WitnessTemplate) -> Result<ScriptBuf, CompileError> {
    match clause {
        Clause::Variable(var) => compile_variable(var, witness),
        Clause::Signature(key) => compile_signature(key, witness),
        Clause::Preimage(image) => compile_preimage(image, witness),
        Clause::Template(hash) => compile_template(hash, witness),
        Clause::After(time) => compile_after(time),
        Clause::And(clauses) => {
            let mut fragments = Vec::with_capacity(clauses.len());
            for clause in clauses {
                fragments.push(compile(clause, witness)?);
            }
            Ok(concat(fragments))
        }
    }
}

/// Compile each branch and assemble the shared program
///
/// Every branch gets its own [`WitnessTemplate`]; with more than one branch
/// the program is an `IF`/`ELSE` ladder and each template gains the constant
/// selector items that steer execution into its branch. An empty branch list
/// yields an empty, unspendable program.
///
/// # Errors
///
/// Returns the first [`CompileError`] raised by any branch.
pub fn compile_branches(branches: &[Clause]) -> Result<WitnessManager, CompileError> {
    let mut witnesses = Vec::with_capacity(branches.len());
    let mut fragments = Vec::with_capacity(branches.len());
    for branch in branches {
        let mut witness = WitnessTemplate::new();
        fragments.push(compile(branch, &mut witness)?);
        witnesses.push(witness);
    }
    let program = assemble(fragments, &mut witnesses);
    debug!(
        "compiled {} branch(es) into a {}-byte program",
        witnesses.len(),
        program.len()
    );
    Ok(WitnessManager::new(program, witnesses))
}

fn compile_variable(
    var: &Variable,
    witness: &mut WitnessTemplate,
) -> Result<ScriptBuf, CompileError> {
    match var.value() {
        None => {
            witness.add_slot(WitnessName::for_slot(var.name()));
            Ok(ScriptBuf::new())
        }
        Some(value) => push_value(var.name(), value),
    }
}

fn compile_signature(
    key: &Variable,
    witness: &mut WitnessTemplate,
) -> Result<ScriptBuf, CompileError> {
    let value = resolved(key)?;
    match value {
        FieldValue::Key(_) | FieldValue::Bytes(_) => {}
        other => {
            return Err(CompileError::WrongKind {
                name: key.name().to_string(),
                expected: "a key",
                found: other.kind(),
            })
        }
    }
    // The signature is spender data; only the key lands in the script.
    let slot = compile_variable(
        &Variable::unresolved(format!("{SIGNATURE_MARKER}{}", key.name())),
        witness,
    )?;
    Ok(concat([slot, push_value(key.name(), value)?, op(OP_CHECKSIGVERIFY)]))
}

fn compile_preimage(
    image: &Variable,
    witness: &mut WitnessTemplate,
) -> Result<ScriptBuf, CompileError> {
    let value = resolved(image)?;
    match value {
        FieldValue::Hash(_) => {}
        FieldValue::Bytes(bytes) if bytes.len() == 32 => {}
        FieldValue::Bytes(bytes) => {
            return Err(CompileError::BadHashLength {
                name: image.name().to_string(),
                len: bytes.len(),
            })
        }
        other => {
            return Err(CompileError::WrongKind {
                name: image.name().to_string(),
                expected: "a 32-byte digest",
                found: other.kind(),
            })
        }
    }
    // The revealed preimage is hashed and compared against the clause's own
    // stored digest.
    let slot = compile_variable(
        &Variable::unresolved(format!("{PREIMAGE_MARKER}{}", image.name())),
        witness,
    )?;
    Ok(concat([
        slot,
        op(OP_SHA256),
        push_value(image.name(), value)?,
        op(OP_EQUALVERIFY),
    ]))
}

fn compile_template(
    hash_var: &Variable,
    witness: &mut WitnessTemplate,
) -> Result<ScriptBuf, CompileError> {
    let value = resolved(hash_var)?;
    let hash: [u8; 32] = match value {
        FieldValue::Hash(hash) => *hash,
        FieldValue::Bytes(bytes) => {
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CompileError::BadHashLength {
                    name: hash_var.name().to_string(),
                    len: bytes.len(),
                })?
        }
        other => {
            return Err(CompileError::WrongKind {
                name: hash_var.name().to_string(),
                expected: "a 32-byte template hash",
                found: other.kind(),
            })
        }
    };
    witness.enforce_template(TemplateHash::from_byte_array(hash))?;
    Ok(Builder::new()
        .push_slice(hash)
        .push_opcode(OP_NOP4)
        .push_opcode(OP_DROP)
        .into_script())
}

fn compile_after(time: &Variable) -> Result<ScriptBuf, CompileError> {
    match resolved(time)? {
        FieldValue::Time(TimeSpec::Absolute(height)) => Ok(Builder::new()
            .push_int(i64::from(*height))
            .push_opcode(OP_CLTV)
            .push_opcode(OP_DROP)
            .into_script()),
        FieldValue::Time(TimeSpec::Relative(age)) => Ok(Builder::new()
            .push_int(i64::from(*age))
            .push_opcode(OP_CSV)
            .push_opcode(OP_DROP)
            .into_script()),
        other => Err(CompileError::WrongKind {
            name: time.name().to_string(),
            expected: "a time constraint",
            found: other.kind(),
        }),
    }
}

fn resolved(var: &Variable) -> Result<&FieldValue, CompileError> {
    var.value().ok_or_else(|| CompileError::Unresolved {
        name: var.name().to_string(),
    })
}

fn push_value(name: &str, value: &FieldValue) -> Result<ScriptBuf, CompileError> {
    let builder = Builder::new();
    let builder = match value {
        FieldValue::Bytes(bytes) => {
            let push =
                PushBytesBuf::try_from(bytes.clone()).map_err(|_| CompileError::OversizedPush {
                    name: name.to_string(),
                })?;
            builder.push_slice(push)
        }
        FieldValue::Int(n) => builder.push_int(*n),
        FieldValue::Key(key) => builder.push_key(key),
        FieldValue::Hash(hash) => builder.push_slice(*hash),
        FieldValue::Time(TimeSpec::Absolute(n) | TimeSpec::Relative(n)) => {
            builder.push_int(i64::from(*n))
        }
    };
    Ok(builder.into_script())
}

fn op(opcode: Opcode) -> ScriptBuf {
    Builder::new().push_opcode(opcode).into_script()
}

fn concat(parts: impl IntoIterator<Item = ScriptBuf>) -> ScriptBuf {
    let mut bytes = Vec::new();
    for part in parts {
        bytes.extend_from_slice(part.as_bytes());
    }
    ScriptBuf::from_bytes(bytes)
}

/// Join branch fragments into one program and record branch selectors
///
/// With `n > 1` branches the ladder reads `IF f0 ELSE IF f1 ELSE ... ENDIF`,
/// so branch `i` is selected by one truthy item under `i` empty items: the
/// empties feed the outer `IF`s, the truthy item feeds branch `i`'s own.
fn assemble(mut fragments: Vec<ScriptBuf>, witnesses: &mut [WitnessTemplate]) -> ScriptBuf {
    let branches = fragments.len();
    if branches == 0 {
        return ScriptBuf::new();
    }
    if branches == 1 {
        return concat([fragments.remove(0), op(OP_PUSHNUM_1)]);
    }

    let mut parts = Vec::with_capacity(4 * branches);
    for (index, fragment) in fragments.into_iter().enumerate() {
        let last = index == branches - 1;
        if !last {
            parts.push(op(OP_IF));
        }
        parts.push(fragment);
        if !last {
            parts.push(op(OP_ELSE));
            witnesses[index].add_literal(vec![1]);
        }
        for _ in 0..index {
            witnesses[index].add_literal(Vec::new());
        }
    }
    for _ in 0..branches - 1 {
        parts.push(op(OP_ENDIF));
    }
    parts.push(op(OP_PUSHNUM_1));
    concat(parts)
}
